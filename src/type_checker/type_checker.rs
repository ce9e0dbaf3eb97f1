use crate::{
    ast::{
        ast::{DeclId, DeclKind, Declaration, Program, Symbol},
        expressions::{BinaryOp, CastKind, ExprKind, Expression, UnaryOp, Variable, VariableKind},
        statements::{Statement, StmtKind},
        types::Type,
    },
    errors::errors::{Error, ErrorImpl},
};

use super::symbol_table::SymbolTable;

/// Semantic analysis state for one program.
pub struct TypeChecker<'a> {
    pub symbols: SymbolTable,
    declarations: &'a [Declaration],
    return_type: Type,
}

fn mismatch(expected: impl ToString, received: &Type, line: i32) -> Error {
    Error::new(
        ErrorImpl::TypeMismatch {
            expected: expected.to_string(),
            received: received.to_string(),
        },
        line,
    )
}

/// Reading a `char` produces an `int`.
fn widen_char(ty: Type) -> Type {
    if ty.is_char() {
        Type::INT
    } else {
        ty
    }
}

impl<'a> TypeChecker<'a> {
    pub fn new(declarations: &'a [Declaration]) -> Self {
        TypeChecker {
            symbols: SymbolTable::new(),
            declarations,
            return_type: Type::VOID,
        }
    }

    fn declaration(&self, id: DeclId) -> &'a Declaration {
        let declarations = self.declarations;
        &declarations[id.0]
    }

    fn declare(&mut self, id: DeclId) -> Result<(), Error> {
        let declaration = self.declaration(id);
        self.symbols
            .add(&declaration.name, id, self.declarations, declaration.line)
    }

    fn resolve(&self, symbol: &Symbol, line: i32) -> Result<DeclId, Error> {
        match symbol {
            Symbol::Name(name) => self.symbols.find(name, line),
            Symbol::Resolved(id) => Ok(*id),
        }
    }

    /// Checks one function body with its parameters in scope.
    pub fn type_check_function(&mut self, id: DeclId, body: &mut Statement) -> Result<(), Error> {
        let function = self.declaration(id);
        self.return_type = function.ty;

        self.symbols.open_block();
        for parameter in function.parameters() {
            self.declare(*parameter)?;
        }
        let returned = type_check_stmt(self, body)?;
        self.symbols.close_block();

        if returned {
            return Ok(());
        }

        if !function.ty.is_void() {
            return Err(Error::new(
                ErrorImpl::MissingReturn {
                    function: function.name.clone(),
                },
                function.line,
            ));
        }

        if let StmtKind::Block { statements, .. } = &mut body.kind {
            statements.push(Statement {
                kind: StmtKind::Return(None),
                line: -1,
                has_returned: true,
            });
        }
        body.has_returned = true;

        Ok(())
    }

    /// Checks `expr` against a location of type `target` and inserts the
    /// conversion the store needs.
    pub fn insert_assignment_cast(
        &self,
        target: Type,
        expr: &mut Expression,
        line: i32,
    ) -> Result<(), Error> {
        if expr.ty.is_null() && target.is_array() {
            expr.ty = target;
            return Ok(());
        }

        if !target.is_assignable(&expr.ty) {
            return Err(mismatch(target, &expr.ty, line));
        }

        // Stores into a char truncate an int
        let goal = widen_char(target);

        if goal.is_int() && expr.ty.is_float() {
            expr.wrap_in_cast(Type::INT, CastKind::FloatToInt);
        } else if goal.is_float() && expr.ty.is_int() {
            expr.wrap_in_cast(Type::FLOAT, CastKind::IntToFloat);
        }

        Ok(())
    }
}

/// Widens the `int` side of a mixed `int`/`float` pair.
fn insert_numerical_cast(left: &mut Expression, right: &mut Expression) {
    if left.ty == right.ty {
        return;
    }

    if left.ty.is_int() {
        left.wrap_in_cast(Type::FLOAT, CastKind::IntToFloat);
    } else {
        right.wrap_in_cast(Type::FLOAT, CastKind::IntToFloat);
    }
}

/// Analyzes the whole program in place: resolves names, assigns types,
/// inserts casts and checks returns.
///
/// Fails on the first error. Running it again on an analyzed program does
/// nothing.
pub fn type_check(program: &mut Program) -> Result<(), Error> {
    if program.analyzed {
        return Ok(());
    }

    for id in program.top_level.clone() {
        if let DeclKind::Variable { is_global } = &mut program.declaration_mut(id).kind {
            *is_global = true;
        }
    }

    let mut bodies = vec![];
    for id in program.top_level.iter().copied() {
        if let DeclKind::Function { body, .. } = &mut program.declarations[id.0].kind {
            if let Some(body) = body.take() {
                bodies.push((id, body));
            }
        }
    }

    let result = type_check_bodies(&program.declarations, &program.top_level, &mut bodies);

    for (id, body) in bodies {
        if let DeclKind::Function { body: slot, .. } = &mut program.declaration_mut(id).kind {
            *slot = Some(body);
        }
    }

    result?;
    program.analyzed = true;

    Ok(())
}

fn type_check_bodies(
    declarations: &[Declaration],
    top_level: &[DeclId],
    bodies: &mut [(DeclId, Box<Statement>)],
) -> Result<(), Error> {
    let mut type_checker = TypeChecker::new(declarations);

    // Every top-level name is visible in every body
    for id in top_level {
        type_checker.declare(*id)?;
    }

    for (id, body) in bodies.iter_mut() {
        type_checker.type_check_function(*id, body)?;
    }

    Ok(())
}

/// Checks a statement and returns whether every path through it returns.
pub fn type_check_stmt(type_checker: &mut TypeChecker, stmt: &mut Statement) -> Result<bool, Error> {
    let line = stmt.line;

    let returned = match &mut stmt.kind {
        StmtKind::Block {
            declarations,
            statements,
        } => type_check_block(type_checker, declarations, statements)?,
        StmtKind::If {
            condition,
            then_branch,
            else_branch,
        } => {
            type_check_condition(type_checker, condition)?;
            let then_returned = type_check_stmt(type_checker, then_branch)?;
            let else_returned = match else_branch {
                Some(else_branch) => type_check_stmt(type_checker, else_branch)?,
                None => false,
            };

            then_returned && else_returned
        }
        StmtKind::While { condition, body } => {
            type_check_condition(type_checker, condition)?;
            type_check_stmt(type_checker, body)?;

            false
        }
        StmtKind::Assign { target, value } => {
            type_check_variable(type_checker, target)?;
            type_check_expr(type_checker, value)?;
            type_checker.insert_assignment_cast(target.ty, value, line)?;

            false
        }
        StmtKind::Delete(value) => {
            type_check_expr(type_checker, value)?;
            if !value.ty.is_array() {
                return Err(mismatch("array", &value.ty, line));
            }

            false
        }
        StmtKind::Print(arguments) => {
            for argument in arguments.iter_mut() {
                type_check_expr(type_checker, argument)?;
            }

            false
        }
        StmtKind::Return(value) => {
            let expected = type_checker.return_type;

            match value {
                None if !expected.is_void() => {
                    return Err(mismatch(expected, &Type::VOID, line));
                }
                None => {}
                Some(value) => {
                    type_check_expr(type_checker, value)?;

                    if expected.is_void() {
                        if !value.ty.is_void() {
                            return Err(mismatch(expected, &value.ty, line));
                        }
                    } else {
                        type_checker.insert_assignment_cast(expected, value, line)?;
                    }
                }
            }

            true
        }
        StmtKind::Call(call) => {
            type_check_expr(type_checker, call)?;

            false
        }
    };

    stmt.has_returned = returned;
    Ok(returned)
}

fn type_check_block(
    type_checker: &mut TypeChecker,
    declarations: &[DeclId],
    statements: &mut [Statement],
) -> Result<bool, Error> {
    type_checker.symbols.open_block();

    for id in declarations {
        type_checker.declare(*id)?;
    }

    let mut returned = false;
    for stmt in statements.iter_mut() {
        if returned {
            return Err(Error::new(ErrorImpl::UnreachableStatement, stmt.line));
        }
        returned = type_check_stmt(type_checker, stmt)?;
    }

    type_checker.symbols.close_block();

    Ok(returned)
}

fn type_check_condition(type_checker: &mut TypeChecker, condition: &mut Expression) -> Result<(), Error> {
    type_check_expr(type_checker, condition)?;

    if !condition.ty.is_bool() {
        return Err(mismatch(Type::BOOL, &condition.ty, condition.line));
    }

    Ok(())
}

pub fn type_check_variable(type_checker: &mut TypeChecker, variable: &mut Variable) -> Result<(), Error> {
    let line = variable.line;

    let ty = match &mut variable.kind {
        VariableKind::Reference(symbol) => {
            let id = type_checker.resolve(symbol, line)?;
            let declaration = type_checker.declaration(id);

            if declaration.is_callable() {
                return Err(Error::new(
                    ErrorImpl::NotAVariable {
                        symbol: declaration.name.clone(),
                    },
                    line,
                ));
            }

            *symbol = Symbol::Resolved(id);
            declaration.ty
        }
        VariableKind::Array { location, offset } => {
            type_check_expr(type_checker, location)?;
            type_check_expr(type_checker, offset)?;

            if !location.ty.is_array() {
                return Err(mismatch("array", &location.ty, line));
            }
            if !offset.ty.is_int() {
                return Err(mismatch(Type::INT, &offset.ty, line));
            }

            location.ty.element()
        }
    };

    variable.ty = ty;
    Ok(())
}

fn type_check_call(
    type_checker: &mut TypeChecker,
    callee: &mut Symbol,
    arguments: &mut [Expression],
    line: i32,
) -> Result<Type, Error> {
    let id = type_checker.resolve(callee, line)?;
    let function = type_checker.declaration(id);

    if !function.is_callable() {
        return Err(Error::new(
            ErrorImpl::NotCallable {
                symbol: function.name.clone(),
            },
            line,
        ));
    }

    let parameters = function.parameters();
    if parameters.len() != arguments.len() {
        return Err(Error::new(
            ErrorImpl::ArityMismatch {
                function: function.name.clone(),
                expected: parameters.len(),
                received: arguments.len(),
            },
            line,
        ));
    }

    for (argument, parameter) in arguments.iter_mut().zip(parameters) {
        type_check_expr(type_checker, argument)?;
        let parameter_ty = type_checker.declaration(*parameter).ty;
        type_checker.insert_assignment_cast(parameter_ty, argument, line)?;
    }

    *callee = Symbol::Resolved(id);
    Ok(widen_char(function.ty))
}

fn type_check_binary(
    type_checker: &mut TypeChecker,
    op: BinaryOp,
    left: &mut Expression,
    right: &mut Expression,
    line: i32,
) -> Result<Type, Error> {
    type_check_expr(type_checker, left)?;
    type_check_expr(type_checker, right)?;

    if op.is_logical() {
        if !left.ty.is_bool() {
            return Err(mismatch(Type::BOOL, &left.ty, line));
        }
        if !right.ty.is_bool() {
            return Err(mismatch(Type::BOOL, &right.ty, line));
        }

        return Ok(Type::BOOL);
    }

    if op.is_equality() {
        if left.ty.is_null() && right.ty.is_array() {
            left.ty = right.ty;
        } else if right.ty.is_null() && left.ty.is_array() {
            right.ty = left.ty;
        }

        if left.ty.is_numerical() && right.ty.is_numerical() {
            insert_numerical_cast(left, right);
        } else if !(left.ty == right.ty && (left.ty.is_bool() || left.ty.is_array())) {
            return Err(mismatch(left.ty, &right.ty, line));
        }

        return Ok(Type::BOOL);
    }

    if !left.ty.is_numerical() {
        return Err(mismatch("int or float", &left.ty, line));
    }
    if !right.ty.is_numerical() {
        return Err(mismatch("int or float", &right.ty, line));
    }

    insert_numerical_cast(left, right);

    if op.is_relational() {
        Ok(Type::BOOL)
    } else {
        Ok(left.ty)
    }
}

/// Assigns a type to `expr` and everything below it.
pub fn type_check_expr(type_checker: &mut TypeChecker, expr: &mut Expression) -> Result<(), Error> {
    let line = expr.line;

    let ty = match &mut expr.kind {
        ExprKind::Bool(_) => Type::BOOL,
        ExprKind::Int(_) => Type::INT,
        ExprKind::Float(_) => Type::FLOAT,
        ExprKind::Str(_) => Type::STRING,
        ExprKind::Null => Type::NULL,
        ExprKind::Call { callee, arguments } => {
            type_check_call(type_checker, callee, arguments, line)?
        }
        ExprKind::Variable(variable) => {
            type_check_variable(type_checker, variable)?;
            widen_char(variable.ty)
        }
        ExprKind::New { element, size } => {
            type_check_expr(type_checker, size)?;
            if !size.ty.is_int() {
                return Err(mismatch(Type::INT, &size.ty, line));
            }

            element.array_of()
        }
        ExprKind::Unary { op, operand } => {
            type_check_expr(type_checker, operand)?;

            match op {
                UnaryOp::Minus if !operand.ty.is_numerical() => {
                    return Err(mismatch("int or float", &operand.ty, line));
                }
                UnaryOp::Not if !operand.ty.is_bool() => {
                    return Err(mismatch(Type::BOOL, &operand.ty, line));
                }
                _ => operand.ty,
            }
        }
        ExprKind::Binary { op, left, right } => {
            type_check_binary(type_checker, *op, left, right, line)?
        }
        // Casts only exist on analyzed trees
        ExprKind::Cast { .. } => return Ok(()),
    };

    expr.ty = ty;
    Ok(())
}
