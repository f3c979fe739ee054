//! Named variable slots
//!
//! A [`Session`] holds the five slots `A`–`E` a client works with. Each slot
//! is empty or holds one matrix or one vector; defining one kind replaces the
//! other. Calls written against slot names are bound to concrete
//! [`Request`]s before they reach the [`Workbench`](crate::Workbench).

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use workbench_core::{
    DeterminantMethod, Matrix, MatrixOperationKind, SolveMethod, Vector, WorkbenchError,
};

use crate::api::*;
use crate::operation::Request;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Slot {
    A,
    B,
    C,
    D,
    E,
}

impl Slot {
    pub const ALL: [Slot; 5] = [Slot::A, Slot::B, Slot::C, Slot::D, Slot::E];

    pub fn name(self) -> &'static str {
        match self {
            Slot::A => "A",
            Slot::B => "B",
            Slot::C => "C",
            Slot::D => "D",
            Slot::E => "E",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Slot {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Slot::ALL
            .into_iter()
            .find(|slot| slot.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| SessionError::UnknownSlot(s.to_string()))
    }
}

impl TryFrom<String> for Slot {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Slot> for String {
    fn from(slot: Slot) -> Self {
        slot.name().to_string()
    }
}

/// Contents of a defined slot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Variable {
    Matrix(Matrix),
    Vector(Vector),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SessionError {
    #[error("unknown slot {0:?}, expected one of A-E")]
    UnknownSlot(String),
    #[error("slot {0} is empty")]
    Empty(Slot),
    #[error("slot {slot} holds a {found}, expected a {expected}")]
    WrongKind {
        slot: Slot,
        expected: &'static str,
        found: &'static str,
    },
    #[error(transparent)]
    Engine(#[from] WorkbenchError),
}

/// Variable slots owned by one client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Session {
    slots: BTreeMap<Slot, Variable>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn define_matrix(&mut self, slot: Slot, matrix: Matrix) {
        self.slots.insert(slot, Variable::Matrix(matrix));
    }

    pub fn define_vector(&mut self, slot: Slot, vector: Vector) {
        self.slots.insert(slot, Variable::Vector(vector));
    }

    pub fn define(&mut self, slot: Slot, variable: Variable) {
        self.slots.insert(slot, variable);
    }

    /// Empty a slot, returning what it held
    pub fn clear(&mut self, slot: Slot) -> Option<Variable> {
        self.slots.remove(&slot)
    }

    pub fn get(&self, slot: Slot) -> Option<&Variable> {
        self.slots.get(&slot)
    }

    /// Defined slots in order
    pub fn defined(&self) -> impl Iterator<Item = (Slot, &Variable)> {
        self.slots.iter().map(|(slot, variable)| (*slot, variable))
    }

    /// The matrix in `slot`
    pub fn matrix(&self, slot: Slot) -> Result<&Matrix, SessionError> {
        match self.get(slot) {
            Some(Variable::Matrix(m)) => Ok(m),
            Some(Variable::Vector(_)) => Err(SessionError::WrongKind {
                slot,
                expected: "matrix",
                found: "vector",
            }),
            None => Err(SessionError::Empty(slot)),
        }
    }

    /// The vector in `slot`; a 1×n or n×1 matrix is accepted as a vector
    pub fn vector(&self, slot: Slot) -> Result<Vector, SessionError> {
        match self.get(slot) {
            Some(Variable::Vector(v)) => Ok(v.clone()),
            Some(Variable::Matrix(m)) => Ok(Vector::from_matrix(m)?),
            None => Err(SessionError::Empty(slot)),
        }
    }

    pub fn vectors(&self, slots: &[Slot]) -> Result<Vec<Vector>, SessionError> {
        slots.iter().map(|slot| self.vector(*slot)).collect()
    }

    fn rows(&self, slot: Slot) -> Result<Rows, SessionError> {
        Ok(self.matrix(slot)?.rows().to_vec())
    }

    fn components(&self, slots: &[Slot]) -> Result<Vec<Components>, SessionError> {
        Ok(self
            .vectors(slots)?
            .into_iter()
            .map(Vector::into_components)
            .collect())
    }

    /// Resolve the slot names in `call` into a concrete request
    pub fn bind(&self, call: &SlotCall) -> Result<Request, SessionError> {
        let request = match call {
            SlotCall::MatrixOperate {
                operation,
                a,
                b,
                scalar,
            } => Request::MatrixOperate(MatrixOperationRequest {
                operation: *operation,
                a: self.matrix(*a)?.clone().into(),
                b: b.map(|b| self.matrix(b).cloned())
                    .transpose()?
                    .map(MatrixPayload::from),
                scalar: *scalar,
            }),
            SlotCall::Determinant { matrix, method } => Request::Determinant(DeterminantRequest {
                matrix: self.rows(*matrix)?,
                method: *method,
            }),
            SlotCall::DeterminantProperties { matrix, b } => {
                Request::DeterminantProperties(PropertiesRequest {
                    matrix: self.rows(*matrix)?,
                    b: b.map(|b| self.rows(b)).transpose()?,
                })
            }
            SlotCall::LinearSystem { augmented, method } => {
                Request::LinearSystem(LinearSystemRequest {
                    augmented: self.rows(*augmented)?,
                    method: *method,
                })
            }
            SlotCall::Independence { vectors } => Request::Independence(VectorsRequest {
                vectors: self.components(vectors)?,
            }),
            SlotCall::Basis { vectors, dimension } => Request::Basis(BasisRequest {
                vectors: self.components(vectors)?,
                dimension: *dimension,
            }),
            SlotCall::Combination { vectors, target } => Request::Combination(CombinationRequest {
                vectors: self.components(vectors)?,
                target: self.vector(*target)?.into_components(),
            }),
        };
        Ok(request)
    }
}

/// An operation whose operands are slot names
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum SlotCall {
    MatrixOperate {
        operation: MatrixOperationKind,
        a: Slot,
        #[serde(default)]
        b: Option<Slot>,
        #[serde(default)]
        scalar: Option<f64>,
    },
    Determinant {
        matrix: Slot,
        #[serde(default)]
        method: DeterminantMethod,
    },
    DeterminantProperties {
        matrix: Slot,
        #[serde(default)]
        b: Option<Slot>,
    },
    LinearSystem {
        augmented: Slot,
        #[serde(default)]
        method: SolveMethod,
    },
    Independence {
        vectors: Vec<Slot>,
    },
    Basis {
        vectors: Vec<Slot>,
        #[serde(default)]
        dimension: Option<usize>,
    },
    Combination {
        vectors: Vec<Slot>,
        target: Slot,
    },
}

/// Variables plus the calls to run against them
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    #[serde(default)]
    pub variables: Session,
    pub calls: Vec<SlotCall>,
}

impl Script {
    /// Bind every call, stopping at the first unresolved slot
    pub fn bind(&self) -> Result<Vec<Request>, SessionError> {
        self.calls
            .iter()
            .map(|call| self.variables.bind(call))
            .collect()
    }
}

/// Input accepted by the CLI: a script, a batch or a single request
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Document {
    Script(Script),
    Batch(Vec<Request>),
    Single(Request),
}

impl Document {
    /// Requests to evaluate, and whether the caller expects a list back
    pub fn into_requests(self) -> Result<(Vec<Request>, bool), SessionError> {
        match self {
            Document::Script(script) => Ok((script.bind()?, true)),
            Document::Batch(requests) => Ok((requests, true)),
            Document::Single(request) => Ok((vec![request], false)),
        }
    }
}
