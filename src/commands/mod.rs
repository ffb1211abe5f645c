//! Command handlers dispatched from `main`.

pub(crate) mod cdc;
