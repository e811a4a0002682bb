//! Diagnostic codes for categorizing compiler errors and warnings.
//!
//! This module provides the [`DiagnosticCode`] type for uniquely identifying
//! diagnostic messages, enabling users to look up documentation and suppress
//! specific warnings.
//!
//! # Examples
//!
//! ```
//! use decaf_util::diagnostic::DiagnosticCode;
//!
//! let code = DiagnosticCode::E0001;
//! assert_eq!(code.prefix(), "E");
//! assert_eq!(code.number(), 1);
//! assert_eq!(code.as_str(), "E0001");
//! ```

/// A unique code identifying a diagnostic message
///
/// Diagnostic codes follow the format `{prefix}{number}` where:
/// - `prefix` is typically "E" for errors or "W" for warnings
/// - `number` is a 4-digit number (padded with zeros)
///
/// This allows users to reference specific diagnostics in documentation
/// and suppression attributes.
///
/// # Examples
///
/// ```
/// use decaf_util::diagnostic::DiagnosticCode;
///
/// let code = DiagnosticCode::new("E", 1);
/// assert_eq!(code.as_str(), "E0001");
///
/// let warning = DiagnosticCode::W0001;
/// assert_eq!(warning.prefix(), "W");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagnosticCode {
    /// The prefix (e.g., "E" for error, "W" for warning)
    pub prefix: &'static str,
    /// The numeric identifier
    pub number: u32,
}

impl DiagnosticCode {
    /// Create a new diagnostic code
    ///
    /// # Arguments
    ///
    /// * `prefix` - The code prefix (typically "E" or "W")
    /// * `number` - The numeric identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use decaf_util::diagnostic::DiagnosticCode;
    ///
    /// let code = DiagnosticCode::new("E", 1001);
    /// assert_eq!(code.prefix(), "E");
    /// assert_eq!(code.number(), 1001);
    /// ```
    #[inline]
    pub const fn new(prefix: &'static str, number: u32) -> Self {
        Self { prefix, number }
    }

    /// Get the prefix (e.g., "E" for error, "W" for warning)
    ///
    /// # Examples
    ///
    /// ```
    /// use decaf_util::diagnostic::DiagnosticCode;
    ///
    /// assert_eq!(DiagnosticCode::E0001.prefix(), "E");
    /// assert_eq!(DiagnosticCode::W0001.prefix(), "W");
    /// ```
    #[inline]
    pub const fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// Get the numeric identifier
    ///
    /// # Examples
    ///
    /// ```
    /// use decaf_util::diagnostic::DiagnosticCode;
    ///
    /// assert_eq!(DiagnosticCode::E0001.number(), 1);
    /// assert_eq!(DiagnosticCode::W0001.number(), 1);
    /// ```
    #[inline]
    pub const fn number(&self) -> u32 {
        self.number
    }

    /// Get the full code string (e.g., "E0001", "W0001")
    ///
    /// # Examples
    ///
    /// ```
    /// use decaf_util::diagnostic::DiagnosticCode;
    ///
    /// assert_eq!(DiagnosticCode::E0001.as_str(), "E0001");
    /// assert_eq!(DiagnosticCode::W0001.as_str(), "W0001");
    /// ```
    pub fn as_str(&self) -> String {
        format!("{}{:04}", self.prefix, self.number)
    }

    // =========================================================================
    // PREDEFINED ERROR CODES (E0001-E9999)
    // =========================================================================

    /// E0001: Syntax error
    pub const E0001: Self = Self::new("E", 1);
    /// E0002: Type mismatch
    pub const E0002: Self = Self::new("E", 2);
    /// E0003: Undefined variable
    pub const E0003: Self = Self::new("E", 3);
    /// E0004: Undefined function
    pub const E0004: Self = Self::new("E", 4);
    /// E0005: Duplicate definition
    pub const E0005: Self = Self::new("E", 5);

    /// E1001: Lexer - Unexpected character
    pub const E_LEXER_UNEXPECTED_CHAR: Self = Self::new("E", 1001);
    /// E1002: Lexer - Unterminated string literal
    pub const E_LEXER_UNTERMINATED_STRING: Self = Self::new("E", 1002);
    /// E1003: Lexer - Invalid numeric literal
    pub const E_LEXER_INVALID_NUMBER: Self = Self::new("E", 1003);
    /// E1004: Lexer - Unknown token
    pub const E_LEXER_UNKNOWN_TOKEN: Self = Self::new("E", 1004);

    /// E2001: Parser - Unexpected token
    pub const E_PARSER_UNEXPECTED_TOKEN: Self = Self::new("E", 2001);
    /// E2002: Parser - Expected token
    pub const E_PARSER_EXPECTED_TOKEN: Self = Self::new("E", 2002);
    /// E2003: Parser - Unexpected end of file
    pub const E_PARSER_UNEXPECTED_EOF: Self = Self::new("E", 2003);
    /// E2004: Parser - Duplicate definition
    pub const E_PARSER_DUPLICATE_DEF: Self = Self::new("E", 2004);

    /// E3001: Semantic - Type mismatch
    pub const E_SEMANTIC_TYPE_MISMATCH: Self = Self::new("E", 3001);
    /// E3002: Semantic - Undefined variable
    pub const E_SEMANTIC_UNDEFINED_VAR: Self = Self::new("E", 3002);
    /// E3003: Semantic - Undefined function
    pub const E_SEMANTIC_UNDEFINED_FN: Self = Self::new("E", 3003);
    /// E3004: Semantic - Mutable binding required
    pub const E_SEMANTIC_MUT_REQUIRED: Self = Self::new("E", 3004);

    // =========================================================================
    // PREDEFINED WARNING CODES (W0001-W9999)
    // =========================================================================

    /// W0001: Unused variable
    pub const W0001: Self = Self::new("W", 1);
    /// W0002: Unused function
    pub const W0002: Self = Self::new("W", 2);
    /// W0003: Dead code
    pub const W0003: Self = Self::new("W", 3);

    /// W4001: Warning - Unused variable (legacy alias)
    pub const W_UNUSED_VARIABLE: Self = Self::new("W", 4001);
    /// W4002: Warning - Unused function (legacy alias)
    pub const W_UNUSED_FUNCTION: Self = Self::new("W", 4002);
    /// W4003: Warning - Dead code (legacy alias)
    pub const W_DEAD_CODE: Self = Self::new("W", 4003);

    // =========================================================================
    // DECAF NAMER CODES (E3500-E3549) - inheritance, declarations, overrides
    // =========================================================================

    /// E3500: Two declarations (classes, or class members) share a name
    pub const E_DECL_CONFLICT: Self = Self::new("E", 3500);
    /// E3501: A type literal names a class that was never declared
    pub const E_CLASS_NOT_FOUND: Self = Self::new("E", 3501);
    /// E3502: The `extends` graph contains a cycle
    pub const E_BAD_INHERITANCE: Self = Self::new("E", 3502);
    /// E3503: A local/member conflicts with an inherited member variable
    pub const E_OVERRIDING_VAR: Self = Self::new("E", 3503);
    /// E3504: An overriding method's signature isn't a subtype of the original
    pub const E_BAD_OVERRIDE: Self = Self::new("E", 3504);
    /// E3505: A concrete class leaves an inherited abstract method unimplemented
    pub const E_NO_ABSTRACT: Self = Self::new("E", 3505);
    /// E3506: No class named `Main` with a valid static `main()` was found
    pub const E_NO_MAIN_CLASS: Self = Self::new("E", 3506);
    /// E3507: An array type literal names `void` as its element type
    pub const E_BAD_ARR_ELEMENT: Self = Self::new("E", 3507);
    /// E3508: A lambda type literal names `void` as a parameter type
    pub const E_VOID_ARGS: Self = Self::new("E", 3508);
    /// E3509: A field declaration names `void` as its type
    pub const E_VOID_FIELD: Self = Self::new("E", 3509);

    // =========================================================================
    // DECAF TYPER CODES (E3550-E3599) - expressions, statements, lambdas
    // =========================================================================

    /// E3550: A name does not resolve to any declared symbol
    pub const E_UNDECL_VAR: Self = Self::new("E", 3550);
    /// E3551: A static method body refers to a member variable/method
    pub const E_REF_NON_STATIC: Self = Self::new("E", 3551);
    /// E3552: `C.m` refers to a non-static member through a class-name receiver
    pub const E_NOT_CLASS_FIELD: Self = Self::new("E", 3552);
    /// E3553: A member is reached from a class that isn't a subtype of its owner
    pub const E_FIELD_NOT_ACCESS: Self = Self::new("E", 3553);
    /// E3554: No member of that name exists on the receiver's class
    pub const E_FIELD_NOT_FOUND: Self = Self::new("E", 3554);
    /// E3555: The callee's type is not a function type
    pub const E_NOT_CALLABLE: Self = Self::new("E", 3555);
    /// E3556: `arr.length()` was called with arguments
    pub const E_BAD_LENGTH_ARG: Self = Self::new("E", 3556);
    /// E3557: A call's argument count does not match the callee's arity
    pub const E_BAD_ARG_COUNT: Self = Self::new("E", 3557);
    /// E3558: A call argument's type is not a subtype of the formal's type
    pub const E_BAD_ARG_TYPE: Self = Self::new("E", 3558);
    /// E3559: A `return` value is not a subtype of the declared return type
    pub const E_BAD_RETURN_TYPE: Self = Self::new("E", 3559);
    /// E3560: `break` appears outside any enclosing loop
    pub const E_BREAK_OUT_OF_LOOP: Self = Self::new("E", 3560);
    /// E3561: `this` appears inside a static method
    pub const E_THIS_IN_STATIC: Self = Self::new("E", 3561);
    /// E3562: A loop/if test expression is not `bool`
    pub const E_BAD_TEST_EXPR: Self = Self::new("E", 3562);
    /// E3563: A `Print` argument is not a base type
    pub const E_BAD_PRINT_ARG: Self = Self::new("E", 3563);
    /// E3564: A `var` local's initializer has type `void`
    pub const E_BAD_VAR_TYPE: Self = Self::new("E", 3564);
    /// E3565: A lambda body assigns to a variable captured from an enclosing frame
    pub const E_ASSIGN_TO_CAPTURED_VAR: Self = Self::new("E", 3565);
    /// E3566: An assignment's target names a member method
    pub const E_ASSIGN_TO_MEMBER_METHOD: Self = Self::new("E", 3566);
    /// E3567: `new C()` names an abstract class
    pub const E_BAD_INSTANTIATE: Self = Self::new("E", 3567);
    /// E3568: Indexing a non-array expression
    pub const E_NOT_ARRAY: Self = Self::new("E", 3568);
    /// E3569: An array index/size expression is not `int`
    pub const E_SUB_NOT_INT: Self = Self::new("E", 3569);
    /// E3570: A block-bodied lambda has a control path that falls off the end
    pub const E_MISSING_RETURN: Self = Self::new("E", 3570);
    /// E3571: A lambda's collected return types have no common join
    pub const E_INCOMPAT_RET_TYPE: Self = Self::new("E", 3571);
    /// E3572: `instanceof`/cast names something that isn't a class
    pub const E_NOT_CLASS: Self = Self::new("E", 3572);
    /// E3573: An assignment's right-hand side is not a subtype of the left
    pub const E_BAD_ASSIGN_TYPE: Self = Self::new("E", 3573);
    /// E3574: A unary operator's operand has the wrong type
    pub const E_BAD_UNARY_TYPE: Self = Self::new("E", 3574);
    /// E3575: A binary operator's operands have the wrong or mismatched types
    pub const E_BAD_BINARY_TYPE: Self = Self::new("E", 3575);
}

impl std::fmt::Debug for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DiagnosticCode({})", self.as_str())
    }
}

impl std::fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Standalone constant exports for convenience
pub const E0001: DiagnosticCode = DiagnosticCode::E0001;
pub const E0002: DiagnosticCode = DiagnosticCode::E0002;
pub const E0003: DiagnosticCode = DiagnosticCode::E0003;
pub const E0004: DiagnosticCode = DiagnosticCode::E0004;
pub const E0005: DiagnosticCode = DiagnosticCode::E0005;
pub const E_LEXER_UNEXPECTED_CHAR: DiagnosticCode = DiagnosticCode::E_LEXER_UNEXPECTED_CHAR;
pub const E_LEXER_UNTERMINATED_STRING: DiagnosticCode = DiagnosticCode::E_LEXER_UNTERMINATED_STRING;
pub const E_LEXER_INVALID_NUMBER: DiagnosticCode = DiagnosticCode::E_LEXER_INVALID_NUMBER;
pub const E_LEXER_UNKNOWN_TOKEN: DiagnosticCode = DiagnosticCode::E_LEXER_UNKNOWN_TOKEN;
pub const E_PARSER_UNEXPECTED_TOKEN: DiagnosticCode = DiagnosticCode::E_PARSER_UNEXPECTED_TOKEN;
pub const E_PARSER_EXPECTED_TOKEN: DiagnosticCode = DiagnosticCode::E_PARSER_EXPECTED_TOKEN;
pub const E_PARSER_UNEXPECTED_EOF: DiagnosticCode = DiagnosticCode::E_PARSER_UNEXPECTED_EOF;
pub const E_PARSER_DUPLICATE_DEF: DiagnosticCode = DiagnosticCode::E_PARSER_DUPLICATE_DEF;
pub const E_SEMANTIC_TYPE_MISMATCH: DiagnosticCode = DiagnosticCode::E_SEMANTIC_TYPE_MISMATCH;
pub const E_SEMANTIC_UNDEFINED_VAR: DiagnosticCode = DiagnosticCode::E_SEMANTIC_UNDEFINED_VAR;
pub const E_SEMANTIC_UNDEFINED_FN: DiagnosticCode = DiagnosticCode::E_SEMANTIC_UNDEFINED_FN;
pub const E_SEMANTIC_MUT_REQUIRED: DiagnosticCode = DiagnosticCode::E_SEMANTIC_MUT_REQUIRED;
pub const W0001: DiagnosticCode = DiagnosticCode::W0001;
pub const W0002: DiagnosticCode = DiagnosticCode::W0002;
pub const W0003: DiagnosticCode = DiagnosticCode::W0003;
pub const W_UNUSED_VARIABLE: DiagnosticCode = DiagnosticCode::W_UNUSED_VARIABLE;
pub const W_UNUSED_FUNCTION: DiagnosticCode = DiagnosticCode::W_UNUSED_FUNCTION;
pub const W_DEAD_CODE: DiagnosticCode = DiagnosticCode::W_DEAD_CODE;

pub const E_DECL_CONFLICT: DiagnosticCode = DiagnosticCode::E_DECL_CONFLICT;
pub const E_CLASS_NOT_FOUND: DiagnosticCode = DiagnosticCode::E_CLASS_NOT_FOUND;
pub const E_BAD_INHERITANCE: DiagnosticCode = DiagnosticCode::E_BAD_INHERITANCE;
pub const E_OVERRIDING_VAR: DiagnosticCode = DiagnosticCode::E_OVERRIDING_VAR;
pub const E_BAD_OVERRIDE: DiagnosticCode = DiagnosticCode::E_BAD_OVERRIDE;
pub const E_NO_ABSTRACT: DiagnosticCode = DiagnosticCode::E_NO_ABSTRACT;
pub const E_NO_MAIN_CLASS: DiagnosticCode = DiagnosticCode::E_NO_MAIN_CLASS;
pub const E_BAD_ARR_ELEMENT: DiagnosticCode = DiagnosticCode::E_BAD_ARR_ELEMENT;
pub const E_VOID_ARGS: DiagnosticCode = DiagnosticCode::E_VOID_ARGS;
pub const E_VOID_FIELD: DiagnosticCode = DiagnosticCode::E_VOID_FIELD;
pub const E_UNDECL_VAR: DiagnosticCode = DiagnosticCode::E_UNDECL_VAR;
pub const E_REF_NON_STATIC: DiagnosticCode = DiagnosticCode::E_REF_NON_STATIC;
pub const E_NOT_CLASS_FIELD: DiagnosticCode = DiagnosticCode::E_NOT_CLASS_FIELD;
pub const E_FIELD_NOT_ACCESS: DiagnosticCode = DiagnosticCode::E_FIELD_NOT_ACCESS;
pub const E_FIELD_NOT_FOUND: DiagnosticCode = DiagnosticCode::E_FIELD_NOT_FOUND;
pub const E_NOT_CALLABLE: DiagnosticCode = DiagnosticCode::E_NOT_CALLABLE;
pub const E_BAD_LENGTH_ARG: DiagnosticCode = DiagnosticCode::E_BAD_LENGTH_ARG;
pub const E_BAD_ARG_COUNT: DiagnosticCode = DiagnosticCode::E_BAD_ARG_COUNT;
pub const E_BAD_ARG_TYPE: DiagnosticCode = DiagnosticCode::E_BAD_ARG_TYPE;
pub const E_BAD_RETURN_TYPE: DiagnosticCode = DiagnosticCode::E_BAD_RETURN_TYPE;
pub const E_BREAK_OUT_OF_LOOP: DiagnosticCode = DiagnosticCode::E_BREAK_OUT_OF_LOOP;
pub const E_THIS_IN_STATIC: DiagnosticCode = DiagnosticCode::E_THIS_IN_STATIC;
pub const E_BAD_TEST_EXPR: DiagnosticCode = DiagnosticCode::E_BAD_TEST_EXPR;
pub const E_BAD_PRINT_ARG: DiagnosticCode = DiagnosticCode::E_BAD_PRINT_ARG;
pub const E_BAD_VAR_TYPE: DiagnosticCode = DiagnosticCode::E_BAD_VAR_TYPE;
pub const E_ASSIGN_TO_CAPTURED_VAR: DiagnosticCode = DiagnosticCode::E_ASSIGN_TO_CAPTURED_VAR;
pub const E_ASSIGN_TO_MEMBER_METHOD: DiagnosticCode = DiagnosticCode::E_ASSIGN_TO_MEMBER_METHOD;
pub const E_BAD_INSTANTIATE: DiagnosticCode = DiagnosticCode::E_BAD_INSTANTIATE;
pub const E_NOT_ARRAY: DiagnosticCode = DiagnosticCode::E_NOT_ARRAY;
pub const E_SUB_NOT_INT: DiagnosticCode = DiagnosticCode::E_SUB_NOT_INT;
pub const E_MISSING_RETURN: DiagnosticCode = DiagnosticCode::E_MISSING_RETURN;
pub const E_INCOMPAT_RET_TYPE: DiagnosticCode = DiagnosticCode::E_INCOMPAT_RET_TYPE;
pub const E_NOT_CLASS: DiagnosticCode = DiagnosticCode::E_NOT_CLASS;
pub const E_BAD_ASSIGN_TYPE: DiagnosticCode = DiagnosticCode::E_BAD_ASSIGN_TYPE;
pub const E_BAD_UNARY_TYPE: DiagnosticCode = DiagnosticCode::E_BAD_UNARY_TYPE;
pub const E_BAD_BINARY_TYPE: DiagnosticCode = DiagnosticCode::E_BAD_BINARY_TYPE;
