//! Registration surface for callback queries.

use courier_core::CallbackQuery;
use courier_core::predicate::{callback_equals, callback_has_prefix};

use super::HandlerRegistry;
use crate::context::Context;
use crate::handler::Handler;

impl HandlerRegistry<CallbackQuery> {
    /// Callback data equals `data` exactly.
    pub fn equal<F, T>(&mut self, data: impl Into<String>, handler: F) -> &mut Self
    where
        F: Handler<T>,
        T: 'static,
    {
        let data = data.into();
        self.add(
            format!("equal:{data}"),
            move |q: &CallbackQuery, _: &Context| callback_equals(q, &data),
            handler,
        )
    }

    /// Callback data starts with `prefix`.
    pub fn prefix<F, T>(&mut self, prefix: impl Into<String>, handler: F) -> &mut Self
    where
        F: Handler<T>,
        T: 'static,
    {
        let prefix = prefix.into();
        self.add(
            format!("prefix:{prefix}"),
            move |q: &CallbackQuery, _: &Context| callback_has_prefix(q, &prefix),
            handler,
        )
    }
}
