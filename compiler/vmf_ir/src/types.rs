//! Hash-consed type references.
//!
//! Every distinct type expression is interned once into a [`TypePool`], so
//! nominal type equality is `TypeId` equality: no assignability, no variance,
//! no unification. Each entry is classified when it is first interned.

use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::type_expr::{short_name, TypeExpr, TypeParseError};
use crate::{Name, SharedInterner, Vocabulary};

/// Index of an interned type in a [`TypePool`].
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct TypeId(u32);

impl TypeId {
    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// Type arguments; factory types rarely carry more than a handful.
pub type TypeArgs = SmallVec<[TypeId; 4]>;

/// Classification computed once per interned type.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum TypeClass {
    Unclassified,
    /// A factory type: all arguments but the last are runtime parameters,
    /// the last is the produced (companion) type.
    Factory { params: TypeArgs, result: TypeId },
}

#[derive(Clone, Eq, PartialEq, Hash, Debug)]
struct TypeKey {
    head: Name,
    args: TypeArgs,
}

/// Interning table for type references.
#[derive(Clone, Debug)]
pub struct TypePool {
    interner: SharedInterner,
    keys: Vec<TypeKey>,
    classes: Vec<TypeClass>,
    map: FxHashMap<TypeKey, TypeId>,
    factory_heads: FxHashSet<Name>,
}

impl TypePool {
    /// Create an empty pool that classifies factory heads from `vocabulary`.
    pub fn new(interner: SharedInterner, vocabulary: &Vocabulary) -> Self {
        let factory_heads = vocabulary
            .factory_types
            .iter()
            .map(|head| interner.intern(head))
            .collect();
        TypePool {
            interner,
            keys: Vec::new(),
            classes: Vec::new(),
            map: FxHashMap::default(),
            factory_heads,
        }
    }

    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// Intern a parsed expression, interning its arguments first.
    pub fn intern_expr(&mut self, expr: &TypeExpr) -> TypeId {
        let args: TypeArgs = expr.args.iter().map(|arg| self.intern_expr(arg)).collect();
        let head = self.interner.intern(&expr.head);
        self.intern_key(TypeKey { head, args })
    }

    /// Parse and intern type text.
    pub fn intern_str(&mut self, text: &str) -> Result<TypeId, TypeParseError> {
        let expr = TypeExpr::parse(text)?;
        Ok(self.intern_expr(&expr))
    }

    fn intern_key(&mut self, key: TypeKey) -> TypeId {
        if let Some(&id) = self.map.get(&key) {
            return id;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "a snapshot never holds 2^32 distinct types"
        )]
        let id = TypeId(self.keys.len() as u32);
        let class = match key.args.split_last() {
            Some((&result, params)) if self.factory_heads.contains(&key.head) => {
                TypeClass::Factory {
                    params: params.iter().copied().collect(),
                    result,
                }
            }
            _ => TypeClass::Unclassified,
        };
        self.keys.push(key.clone());
        self.classes.push(class);
        self.map.insert(key, id);
        id
    }

    /// Find an already-interned expression without inserting anything.
    pub fn lookup_expr(&self, expr: &TypeExpr) -> Option<TypeId> {
        let args = expr
            .args
            .iter()
            .map(|arg| self.lookup_expr(arg))
            .collect::<Option<TypeArgs>>()?;
        let head = self.interner.get(&expr.head)?;
        self.map.get(&TypeKey { head, args }).copied()
    }

    /// Parse type text and find it without inserting.
    pub fn lookup_str(&self, text: &str) -> Option<TypeId> {
        TypeExpr::parse(text)
            .ok()
            .and_then(|expr| self.lookup_expr(&expr))
    }

    pub fn head(&self, id: TypeId) -> Name {
        self.keys[id.index()].head
    }

    pub fn args(&self, id: TypeId) -> &[TypeId] {
        &self.keys[id.index()].args
    }

    pub fn class(&self, id: TypeId) -> &TypeClass {
        &self.classes[id.index()]
    }

    /// Rebuild the expression tree for `id`.
    pub fn to_expr(&self, id: TypeId) -> TypeExpr {
        let key = &self.keys[id.index()];
        TypeExpr {
            head: self.interner.lookup(key.head).to_owned(),
            args: key.args.iter().map(|&arg| self.to_expr(arg)).collect(),
        }
    }

    /// Display string, e.g. `Func<Guid, DetailViewModel>`.
    pub fn display(&self, id: TypeId) -> String {
        self.to_expr(id).to_string()
    }

    /// Last path segment of the head name.
    pub fn short_name(&self, id: TypeId) -> &'static str {
        short_name(self.interner.lookup(self.head(id)))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn pool() -> TypePool {
        TypePool::new(SharedInterner::new(), &Vocabulary::default())
    }

    #[test]
    fn test_interning_is_structural() {
        let mut pool = pool();
        let a = pool.intern_str("Func<Guid, DetailViewModel>");
        let b = pool.intern_str("Func< Guid,DetailViewModel >");
        assert_eq!(a, b);
        assert_eq!(pool.len(), 3);
    }

    #[test]
    fn test_factory_classification() {
        let mut pool = pool();
        let Ok(factory) = pool.intern_str("Func<Guid, DetailViewModel>") else {
            panic!("should parse");
        };
        let guid = pool.lookup_str("Guid");
        let vm = pool.lookup_str("DetailViewModel");
        match pool.class(factory) {
            TypeClass::Factory { params, result } => {
                assert_eq!(params.iter().copied().map(Some).collect::<Vec<_>>(), vec![guid]);
                assert_eq!(Some(*result), vm);
            }
            TypeClass::Unclassified => panic!("expected a factory type"),
        }
    }

    #[test]
    fn test_non_factory_generic_is_unclassified() {
        let mut pool = pool();
        let Ok(list) = pool.intern_str("List<Item>") else {
            panic!("should parse");
        };
        assert_eq!(pool.class(list), &TypeClass::Unclassified);
        // A bare `Func` produces nothing.
        let Ok(bare) = pool.intern_str("Func") else {
            panic!("should parse");
        };
        assert_eq!(pool.class(bare), &TypeClass::Unclassified);
    }

    #[test]
    fn test_lookup_does_not_insert() {
        let mut pool = pool();
        assert_eq!(pool.lookup_str("Logger"), None);
        let Ok(id) = pool.intern_str("App.Logging.Logger") else {
            panic!("should parse");
        };
        assert_eq!(pool.lookup_str("App.Logging.Logger"), Some(id));
        assert_eq!(pool.short_name(id), "Logger");
        assert_eq!(pool.display(id), "App.Logging.Logger");
    }
}
