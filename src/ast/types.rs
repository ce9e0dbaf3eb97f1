//! Type system definitions for the AST.
//!
//! A type is a base tag plus an array depth: `int` has depth 0, `int[]`
//! depth 1 and `int[][]` depth 2. A string is a `char[]`.
//!
//! Types in the AST start out `Undefined` on every expression and are
//! filled in by the type checker.

use std::fmt::Display;

/// Base tag of a [`Type`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    Void,
    Bool,
    Char,
    Int,
    Float,
    /// Type of the `null` literal until it meets an array context.
    Null,
    /// Placeholder before type checking.
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Type {
    pub tag: TypeTag,
    pub pointers: u32,
}

impl Type {
    pub const VOID: Type = Type::new(TypeTag::Void, 0);
    pub const BOOL: Type = Type::new(TypeTag::Bool, 0);
    pub const CHAR: Type = Type::new(TypeTag::Char, 0);
    pub const INT: Type = Type::new(TypeTag::Int, 0);
    pub const FLOAT: Type = Type::new(TypeTag::Float, 0);
    pub const NULL: Type = Type::new(TypeTag::Null, 0);
    pub const UNDEFINED: Type = Type::new(TypeTag::Undefined, 0);
    pub const STRING: Type = Type::new(TypeTag::Char, 1);

    pub const fn new(tag: TypeTag, pointers: u32) -> Self {
        Type { tag, pointers }
    }

    /// The type with one more array level, `T` to `T[]`.
    pub fn array_of(self) -> Type {
        Type::new(self.tag, self.pointers + 1)
    }

    /// The type of an element, `T[]` to `T`.
    pub fn element(self) -> Type {
        Type::new(self.tag, self.pointers.saturating_sub(1))
    }

    pub fn is_void(&self) -> bool {
        self.tag == TypeTag::Void && self.pointers == 0
    }

    pub fn is_bool(&self) -> bool {
        self.tag == TypeTag::Bool && self.pointers == 0
    }

    pub fn is_char(&self) -> bool {
        self.tag == TypeTag::Char && self.pointers == 0
    }

    pub fn is_int(&self) -> bool {
        self.tag == TypeTag::Int && self.pointers == 0
    }

    pub fn is_float(&self) -> bool {
        self.tag == TypeTag::Float && self.pointers == 0
    }

    pub fn is_null(&self) -> bool {
        self.tag == TypeTag::Null
    }

    pub fn is_undefined(&self) -> bool {
        self.tag == TypeTag::Undefined
    }

    pub fn is_numerical(&self) -> bool {
        self.is_int() || self.is_float()
    }

    pub fn is_string(&self) -> bool {
        self.tag == TypeTag::Char && self.pointers == 1
    }

    pub fn is_array(&self) -> bool {
        self.pointers > 0
    }

    /// Whether a value of type `source` may be stored into a location of
    /// type `self`, possibly through an inserted conversion.
    pub fn is_assignable(&self, source: &Type) -> bool {
        if self == source {
            return true;
        }

        if self.is_array() {
            return source.is_null();
        }

        match (self.tag, self.pointers, source.tag, source.pointers) {
            (TypeTag::Int, 0, TypeTag::Float, 0) => true,
            (TypeTag::Float, 0, TypeTag::Int, 0) => true,
            (TypeTag::Char, 0, TypeTag::Int, 0) => true,
            (TypeTag::Char, 0, TypeTag::Float, 0) => true,
            _ => false,
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self.tag {
            TypeTag::Void => "void",
            TypeTag::Bool => "bool",
            TypeTag::Char => "char",
            TypeTag::Int => "int",
            TypeTag::Float => "float",
            TypeTag::Null => "null",
            TypeTag::Undefined => "undefined",
        };

        write!(f, "{}{}", name, "[]".repeat(self.pointers as usize))
    }
}
