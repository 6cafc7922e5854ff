//! Factory-slot extraction.
//!
//! Collection walks one compilation unit at a time and only reads the
//! façade, so units can be processed on any thread in any order. Callers
//! merge per-unit output in unit order.

use vmf_ir::{CompilationUnit, SymbolFacade, TypeClass};

use crate::FactorySlot;

/// Every factory-typed constructor parameter declared in `unit`, in
/// declaration order.
pub fn extract_slots<F: SymbolFacade + ?Sized>(
    facade: &F,
    unit: &CompilationUnit,
) -> Vec<FactorySlot> {
    let pool = facade.pool();
    let mut slots = Vec::new();
    for &idx in &unit.decls {
        let decl = &facade.decls()[idx];
        for ctor in &decl.constructors {
            for param in &ctor.params {
                if let TypeClass::Factory { params, result } = pool.class(param.ty) {
                    slots.push(FactorySlot {
                        view: decl.ty,
                        view_location: decl.location,
                        factory: param.ty,
                        companion: *result,
                        runtime: params.clone(),
                        location: param.location,
                    });
                }
            }
        }
    }
    tracing::trace!(
        file = facade.text(unit.file),
        slots = slots.len(),
        "extracted factory slots"
    );
    slots
}
