//! Procedural macros for facade.
//!
//! - `#[class]` - Expose the `&self` methods of an `impl` block as a dynamic class

use proc_macro::TokenStream;

mod class;

/// Implement `ProxyClass` for the type of an `impl` block.
///
/// Every method taking `&self` becomes a class method with the same name and
/// parameter list. Associated functions without a receiver are left alone.
///
/// # Attribute arguments
///
/// - `name = "..."`: class name (defaults to the type name)
///
/// # Method attributes
///
/// - `#[legacy_names(old = "new", ...)]`: accept old keyword names
///
/// # Parameter attributes
///
/// - `#[arg(default)]`: defaults to `None`
/// - `#[arg(default = expr)]`: defaults to `expr` (anything `Into<Value>`)
/// - `#[arg(varargs)]`: collect surplus positional arguments
/// - `#[arg(varkw)]`: collect surplus keyword arguments
///
/// # Example
///
/// ```rust,ignore
/// struct Operations;
///
/// #[facade::class]
/// impl Operations {
///     /// Issue an "add column" instruction.
///     fn add_column(&self, table_name: String, column: String, #[arg(default)] schema: Option<String>) -> String {
///         format!("{table_name}.{column}")
///     }
/// }
/// ```
#[proc_macro_attribute]
pub fn class(attr: TokenStream, item: TokenStream) -> TokenStream {
    class::class_impl(attr, item)
}
