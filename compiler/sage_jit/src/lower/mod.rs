//! Lowering of function declarations to type-specialized bytecode.
//!
//! Types flow forward from the observed argument signature. Every operator
//! checks its operand types here, once, so the executor never has to. A
//! construct outside the supported subset, or any static type error, rejects
//! the whole function; nothing is ever translated approximately.
//!
//! Supported: literals, identifiers, arrays, single-initializer variable
//! bindings, `+ - * /`, `> < =`, `&& ||`, negation, `if`, `return`.

use rustc_hash::FxHashMap;
use sage_ir::{ArithOp, CompareOp, FunctionDecl, Ident, LogicOp, Name, Node, StringInterner};
use sage_value::{Value, ValueKind};

use crate::bytecode::{CompiledFunction, Index, Op};
use crate::JitError;

/// Static type of the value an expression leaves on the stack.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum StaticType {
    Known(ValueKind),
    /// Depends on the path taken, e.g. an `if` without an else branch.
    Mixed,
}

impl StaticType {
    fn describe(self) -> &'static str {
        match self {
            StaticType::Known(kind) => kind.as_str(),
            StaticType::Mixed => "a value whose type depends on control flow",
        }
    }
}

#[derive(Copy, Clone, Debug)]
struct Local {
    slot: Index,
    ty: StaticType,
}

/// Lower `decl`, specialized for `signature`.
pub fn lower(
    decl: &FunctionDecl,
    signature: &[ValueKind],
    interner: &StringInterner,
) -> Result<CompiledFunction, JitError> {
    if signature.len() != decl.params.len() {
        return Err(JitError::TypeMismatch {
            node: "Func",
            expected: "one argument kind per parameter",
            found: format!("{} kinds for {} parameters", signature.len(), decl.params.len()),
        });
    }

    let mut lowerer = Lowerer::new(interner);
    for (param, kind) in decl.params.iter().zip(signature) {
        lowerer.declare_param(param, *kind)?;
    }
    lowerer.block(&decl.body)?;
    lowerer.emit(Op::Return);

    Ok(CompiledFunction {
        name: decl.name.name,
        display_name: interner.lookup(decl.name.name).to_string(),
        signature: signature.to_vec(),
        constants: lowerer.constants,
        code: lowerer.code,
        slot_count: lowerer.slot_count,
    })
}

struct Lowerer<'a> {
    interner: &'a StringInterner,
    code: Vec<Op>,
    constants: Vec<Value>,
    scope: FxHashMap<Name, Local>,
    slot_count: usize,
}

impl<'a> Lowerer<'a> {
    fn new(interner: &'a StringInterner) -> Self {
        Lowerer {
            interner,
            code: Vec::new(),
            constants: Vec::new(),
            scope: FxHashMap::default(),
            slot_count: 0,
        }
    }

    fn emit(&mut self, op: Op) -> usize {
        self.code.push(op);
        self.code.len() - 1
    }

    fn here(&self) -> Result<u32, JitError> {
        u32::try_from(self.code.len()).map_err(|_| JitError::TooLarge {
            what: "instructions",
            limit: u32::MAX as usize,
        })
    }

    fn patch(&mut self, at: usize, target: u32) {
        if let Some(Op::Jump(t) | Op::JumpIfFalse(t) | Op::JumpIfTrue(t)) = self.code.get_mut(at) {
            *t = target;
        }
    }

    fn index(n: usize, what: &'static str) -> Result<Index, JitError> {
        Index::try_from(n).map_err(|_| JitError::TooLarge {
            what,
            limit: usize::from(Index::MAX),
        })
    }

    fn constant(&mut self, value: Value) -> Result<StaticType, JitError> {
        let kind = value.kind();
        let index = Self::index(self.constants.len(), "constants")?;
        self.constants.push(value);
        self.emit(Op::Const(index));
        Ok(StaticType::Known(kind))
    }

    fn allocate(&mut self, name: Name, ty: StaticType) -> Result<Index, JitError> {
        let slot = Self::index(self.slot_count, "locals")?;
        self.slot_count += 1;
        self.scope.insert(name, Local { slot, ty });
        Ok(slot)
    }

    fn declare_param(&mut self, param: &Ident, kind: ValueKind) -> Result<(), JitError> {
        // A repeated parameter name resolves to its last position.
        self.allocate(param.name, StaticType::Known(kind))?;
        Ok(())
    }

    /// Bind a `Var` target, reusing its slot if it is already in scope.
    fn bind(&mut self, name: &Ident, ty: StaticType) -> Result<Index, JitError> {
        match self.scope.get(&name.name) {
            Some(local) if local.ty == ty => Ok(local.slot),
            Some(local) => Err(JitError::TypeMismatch {
                node: "Var",
                expected: local.ty.describe(),
                found: ty.describe().to_string(),
            }),
            None => self.allocate(name.name, ty),
        }
    }

    /// Statement sequence leaving exactly one value: the last statement's,
    /// or void when empty.
    fn block(&mut self, body: &[Node]) -> Result<StaticType, JitError> {
        let Some((last, init)) = body.split_last() else {
            return self.constant(Value::Void);
        };
        for stmt in init {
            self.expr(stmt)?;
            self.emit(Op::Pop);
        }
        self.expr(last)
    }

    fn expect(
        &mut self,
        node: &Node,
        expected: ValueKind,
        context: &'static str,
    ) -> Result<(), JitError> {
        let ty = self.expr(node)?;
        if ty == StaticType::Known(expected) {
            Ok(())
        } else {
            Err(JitError::TypeMismatch {
                node: context,
                expected: expected.as_str(),
                found: ty.describe().to_string(),
            })
        }
    }

    fn expr(&mut self, node: &Node) -> Result<StaticType, JitError> {
        match node {
            Node::Float { value, .. } => self.constant(Value::Float(*value)),
            Node::Str { value, .. } => self.constant(Value::Str(value.clone())),
            Node::Boolean { value, .. } => self.constant(Value::Bool(*value)),
            Node::Array { elements, .. } => {
                for element in elements {
                    self.expr(element)?;
                }
                let count = Self::index(elements.len(), "array elements")?;
                self.emit(Op::MakeArray(count));
                Ok(StaticType::Known(ValueKind::Array))
            }
            Node::Ident(ident) => {
                let local = self.scope.get(&ident.name).copied().ok_or_else(|| {
                    JitError::UnknownIdentifier {
                        name: self.interner.lookup(ident.name).to_string(),
                    }
                })?;
                self.emit(Op::Load(local.slot));
                Ok(local.ty)
            }
            Node::Arith { op, operands, .. } => self.arith(node, *op, operands),
            Node::Neg { operand, .. } => match self.expr(operand)? {
                StaticType::Known(ValueKind::Float) => {
                    self.emit(Op::NegF);
                    Ok(StaticType::Known(ValueKind::Float))
                }
                StaticType::Known(ValueKind::Bool) => {
                    self.emit(Op::Not);
                    Ok(StaticType::Known(ValueKind::Bool))
                }
                other => Err(JitError::TypeMismatch {
                    node: "Neg",
                    expected: "float or bool",
                    found: other.describe().to_string(),
                }),
            },
            Node::Compare { op, lhs, rhs, .. } => {
                let instruction = match op {
                    CompareOp::Gt | CompareOp::Lt => {
                        let context = node.kind_name();
                        self.expect(lhs, ValueKind::Float, context)?;
                        self.expect(rhs, ValueKind::Float, context)?;
                        if *op == CompareOp::Gt {
                            Op::GtF
                        } else {
                            Op::LtF
                        }
                    }
                    CompareOp::Equal => {
                        self.expr(lhs)?;
                        self.expr(rhs)?;
                        Op::Eq
                    }
                };
                self.emit(instruction);
                Ok(StaticType::Known(ValueKind::Bool))
            }
            Node::Logic { op, operands, .. } => self.logic(*op, operands),
            Node::If {
                condition, body, ..
            } => {
                self.expect(condition, ValueKind::Bool, "If")?;
                let skip = self.emit(Op::JumpIfFalse(0));
                let body_ty = self.block(body)?;
                let done = self.emit(Op::Jump(0));
                let otherwise = self.here()?;
                self.patch(skip, otherwise);
                self.constant(Value::Void)?;
                let end = self.here()?;
                self.patch(done, end);
                Ok(if body_ty == StaticType::Known(ValueKind::Void) {
                    body_ty
                } else {
                    StaticType::Mixed
                })
            }
            Node::Return { value, .. } => {
                self.expr(value)?;
                self.emit(Op::Return);
                Ok(StaticType::Mixed)
            }
            Node::Var { name, values, .. } => {
                let [value] = values.as_slice() else {
                    return Err(JitError::MultipleInitializers {
                        name: self.interner.lookup(name.name).to_string(),
                        count: values.len(),
                    });
                };
                let ty = self.expr(value)?;
                let slot = self.bind(name, ty)?;
                self.emit(Op::Store(slot));
                self.constant(Value::Void)
            }
            Node::For { .. } | Node::Func(_) | Node::Call(_) | Node::Root { .. } => {
                Err(JitError::UnsupportedNode {
                    kind: node.kind_name(),
                })
            }
        }
    }

    fn arith(&mut self, node: &Node, op: ArithOp, operands: &[Node]) -> Result<StaticType, JitError> {
        let instruction = match op {
            ArithOp::Add => Op::AddF,
            ArithOp::Sub => Op::SubF,
            ArithOp::Mul => Op::MulF,
            ArithOp::Div => Op::DivF,
            ArithOp::Mod => {
                return Err(JitError::UnsupportedNode {
                    kind: node.kind_name(),
                })
            }
        };
        let [first, rest @ ..] = operands else {
            return Err(JitError::InvalidOperandCount {
                node: node.kind_name(),
                min: 2,
                found: 0,
            });
        };
        if rest.is_empty() {
            return Err(JitError::InvalidOperandCount {
                node: node.kind_name(),
                min: 2,
                found: 1,
            });
        }
        let context = node.kind_name();
        self.expect(first, ValueKind::Float, context)?;
        for operand in rest {
            self.expect(operand, ValueKind::Float, context)?;
            self.emit(instruction);
        }
        Ok(StaticType::Known(ValueKind::Float))
    }

    fn logic(&mut self, op: LogicOp, operands: &[Node]) -> Result<StaticType, JitError> {
        let short = op.short_circuit_on();
        if operands.is_empty() {
            return self.constant(Value::Bool(!short));
        }
        let context = match op {
            LogicOp::And => "And",
            LogicOp::Or => "Or",
        };
        let mut exits = Vec::with_capacity(operands.len());
        for operand in operands {
            self.expect(operand, ValueKind::Bool, context)?;
            exits.push(self.emit(if short {
                Op::JumpIfTrue(0)
            } else {
                Op::JumpIfFalse(0)
            }));
        }
        self.constant(Value::Bool(!short))?;
        let done = self.emit(Op::Jump(0));
        let short_circuit = self.here()?;
        for exit in exits {
            self.patch(exit, short_circuit);
        }
        self.constant(Value::Bool(short))?;
        let end = self.here()?;
        self.patch(done, end);
        Ok(StaticType::Known(ValueKind::Bool))
    }
}
