use proc_macro::TokenStream as TokenStream1;
use proc_macro2::TokenStream as TokenStream2;
use quote::{quote, ToTokens};
use syn::{self, Ident};

/// This macro is added before a method of `Round` in the impl block.
/// Use this macro to first check if the current round phase is exactly the
/// phase in the attribute.
///
/// For example, `#[allowed_phase(Settlement)]` will make a method first check
/// if `self.phase` is `RoundPhase::Settlement`. If not, the method returns
/// `Err(RoundError::WrongPhase { .. })` without touching the round.
///
/// The annotated method must return `Result<_, RoundError>` and the calling
/// crate must expose `RoundPhase` and `RoundError` at its root.
#[proc_macro_attribute]
pub fn allowed_phase(attr: TokenStream1, item: TokenStream1) -> TokenStream1 {
    let phase: Ident = match syn::parse(attr) {
        Ok(phase) => phase,
        Err(err) => return err.to_compile_error().into(),
    };
    let mut ast: syn::ImplItemFn = match syn::parse(item) {
        Ok(ast) => ast,
        Err(err) => return err.to_compile_error().into(),
    };

    let operation = ast.sig.ident.to_string();
    let guard: syn::Stmt = match syn::parse2(phase_guard(&phase, &operation)) {
        Ok(guard) => guard,
        Err(err) => return err.to_compile_error().into(),
    };
    ast.block.stmts.insert(0, guard);
    ast.into_token_stream().into()
}

fn phase_guard(phase: &Ident, operation: &str) -> TokenStream2 {
    quote! {
        if self.phase != crate::RoundPhase::#phase {
            return Err(crate::RoundError::WrongPhase {
                operation: #operation,
                expected: crate::RoundPhase::#phase,
                actual: self.phase,
            });
        }
    }
}
