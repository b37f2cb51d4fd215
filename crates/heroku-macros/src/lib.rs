//! Proc macros for heroku-dispatch.
//!
//! # Available Macros
//!
//! - [`macro@commands`] - Register the public methods of an impl block as the
//!   actions of a command namespace
//!
//! Users normally reach this crate through `heroku_dispatch::commands`.

mod commands;

use proc_macro::TokenStream;

/// Turns an inherent impl block into a command namespace.
///
/// Every `pub fn` taking only `&self` or `&mut self` becomes an action named
/// after the method. `index` is the namespace's default action. Each action's
/// doc comment is its help text: banner first, then a description, then any
/// option lines.
///
/// The type must implement `From<CommandContext>`; the macro implements
/// `Handler` and `CommandSet` for it.
///
/// # Example
///
/// ```rust,ignore
/// use heroku_dispatch::{commands, CommandContext, HandlerResult, Output};
///
/// pub struct Stack {
///     ctx: CommandContext,
/// }
///
/// impl From<CommandContext> for Stack {
///     fn from(ctx: CommandContext) -> Self {
///         Self { ctx }
///     }
/// }
///
/// /// manage the stack for an app
/// #[commands]
/// impl Stack {
///     /// stack:migrate STACK
///     ///
///     /// prepare migration of this app to a new stack
///     #[alias("migrate")]
///     pub fn migrate(&mut self) -> HandlerResult {
///         let stack = self.ctx.shift_arg().unwrap_or_default();
///         Ok(Output::text(format!("Migrating to {}", stack)))
///     }
/// }
/// ```
///
/// # Arguments
///
/// - `namespace = "x"`: namespace name (default: the type name, lowercased)
/// - `description = "x"`: namespace description (default: the impl block's
///   doc comment)
///
/// # Compile-Time Errors
///
/// - Trait impls and generic impls
/// - Impl blocks with no action
/// - `#[alias]` on a method that is not an action
#[proc_macro_attribute]
pub fn commands(attr: TokenStream, item: TokenStream) -> TokenStream {
    let attr = proc_macro2::TokenStream::from(attr);
    let item = proc_macro2::TokenStream::from(item);
    commands::commands_impl(attr, item)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}
