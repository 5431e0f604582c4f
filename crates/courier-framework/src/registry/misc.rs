//! Registration surfaces for the remaining categories with their own predicates.

use courier_core::predicate::paid_media_has_prefix;
use courier_core::{InlineQuery, PaidMediaPurchased};

use super::HandlerRegistry;
use crate::context::Context;
use crate::handler::Handler;

impl HandlerRegistry<PaidMediaPurchased> {
    /// Purchase payload starts with `prefix`.
    pub fn payload_prefix<F, T>(&mut self, prefix: impl Into<String>, handler: F) -> &mut Self
    where
        F: Handler<T>,
        T: 'static,
    {
        let prefix = prefix.into();
        self.add(
            format!("payload_prefix:{prefix}"),
            move |p: &PaidMediaPurchased, _: &Context| paid_media_has_prefix(p, &prefix),
            handler,
        )
    }
}

impl HandlerRegistry<InlineQuery> {
    /// Inline query text starts with `prefix`.
    pub fn query_prefix<F, T>(&mut self, prefix: impl Into<String>, handler: F) -> &mut Self
    where
        F: Handler<T>,
        T: 'static,
    {
        let prefix = prefix.into();
        self.add(
            format!("query_prefix:{prefix}"),
            move |q: &InlineQuery, _: &Context| q.query.starts_with(prefix.as_str()),
            handler,
        )
    }
}
