//! Grammar texts shared by the unit tests.

/// Left-recursive expression grammar; accepts `id (+ id)*` and builds a
/// left-associative tree.
pub const EXPR: &str = "\
Symbol{Plus},
Identifier,
$
E : [BinOp] E*(expr) Symbol.Plus T(term) ; | T(term) ;
T : Identifier(id) ;
";

/// A nullable start symbol; the empty token stream is accepted.
pub const EMPTY_ALT: &str = "\
A, $
S : A(a) | ;
";

/// Mutual recursion whose AST cycle is broken by the indirect marker.
pub const INDIRECT: &str = "\
L, R, $
Outer : L(l) Inner*(inner) R(r) ;
Inner : Outer(o) | ;
";

/// Same grammar without the indirect marker; AST emission must fail.
pub const INDIRECT_MISSING_STAR: &str = "\
L, R, $
Outer : L(l) Inner(inner) R(r) ;
Inner : Outer(o) | ;
";

/// The dangling-else ambiguity: a shift-reduce conflict on `Else`.
pub const DANGLING_ELSE: &str = "\
If, Then, Else, Expr, $
S : [IfThen] If(i) Expr(e) Then(t) S(s) ;
  | [IfThenElse] If(i) Expr(e) Then(t) S(s) Else(el) S(s2) ;
  | Expr(e) ;
";

/// Two non-terminals reducing the same terminal: a reduce-reduce conflict.
pub const REDUCE_REDUCE: &str = "\
A, $
S : X(x) | Y(y) ;
X : A(x) ;
Y : A(x) ;
";

/// The smallest useful grammar: shift, one reduce, accept.
pub const SINGLE: &str = "\
A, $
S : A(a) ;
";

/// The Chloro toy language (see demos/chloro.grammar and the chlex tool).
pub const CHLORO: &str = "\
Symbol{Equal, Semicolon, Colon, LeftParen, RightParen, LeftBrace, RightBrace},
Keyword{Int, Def, Return},
Identifier,
Integer,
$
Script : Items(items) ;
Items : [More] Items*(rest) Item(item) ; | ;
Item : VarDecl(var) ; | FuncDecl(func) ;
VarDecl : Identifier(name) Symbol.Colon Keyword.Int Symbol.Equal Integer(value) Symbol.Semicolon ;
FuncDecl : Keyword.Def Identifier(name) Symbol.LeftParen Param(param) Symbol.RightParen
           Symbol.Colon Keyword.Int Symbol.LeftBrace Items*(body) Symbol.RightBrace ;
Param : Identifier(name) Symbol.Colon Keyword.Int ;
";
