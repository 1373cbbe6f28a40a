//! Renders the normalized model as configuration sections.
//!
//! Mapping cannot fail: every value of the model renders to valid
//! statements.

mod backend;
mod common;
mod frontend;
mod instance;
mod resolver;

#[cfg(test)]
mod tests;

pub use self::{
    backend::backend,
    frontend::frontend,
    instance::{defaults, global, metrics},
    resolver::resolver,
};

use crate::{
    fragment::Fragment,
    model::{Condition, Listen},
};

/// Renders both halves of a listen: a frontend section followed by a backend
/// section of the same name.
pub fn listen(listen: &Listen) -> (Fragment, Fragment) {
    let (front, back) = listen.split();
    (frontend(&front), backend(&back))
}

/// Formats an optional trailing condition, including its leading space.
fn cond(condition: &Option<Condition>) -> String {
    match condition {
        Some(condition) => format!(" {condition}"),
        None => String::new(),
    }
}
