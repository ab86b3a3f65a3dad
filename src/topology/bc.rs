//! Boundary condition descriptors.
//!
//! [`BoundaryConds`] holds one [`BoundaryCode`] per axis and side. The
//! matrix is validated on every construction and mutation: codes must be in
//! range, and an axis that is periodic on one side must be periodic on both.

use std::fmt;

use crate::mra_error::MraError;

/// Symbolic boundary code for one side of one axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BoundaryCode {
    /// Function vanishes at the boundary.
    Zero = 0,
    /// Domain wraps around.
    Periodic = 1,
    /// No constraint.
    Free = 2,
    /// Prescribed nonzero value.
    Dirichlet = 3,
    /// Derivative vanishes at the boundary.
    Neumann = 4,
    /// Prescribed nonzero derivative.
    NonzeroDerivative = 5,
}

impl BoundaryCode {
    pub const ALL: [BoundaryCode; 6] = [
        BoundaryCode::Zero,
        BoundaryCode::Periodic,
        BoundaryCode::Free,
        BoundaryCode::Dirichlet,
        BoundaryCode::Neumann,
        BoundaryCode::NonzeroDerivative,
    ];

    /// Integer code (0..=5).
    pub fn code(self) -> i32 {
        self as i32
    }

    /// Stable, human-readable name.
    pub fn name(self) -> &'static str {
        match self {
            BoundaryCode::Zero => "zero",
            BoundaryCode::Periodic => "periodic",
            BoundaryCode::Free => "free",
            BoundaryCode::Dirichlet => "dirichlet",
            BoundaryCode::Neumann => "neumann",
            BoundaryCode::NonzeroDerivative => "nonzero-derivative",
        }
    }

    /// Inverse of [`BoundaryCode::name`].
    pub fn from_name(name: &str) -> Result<Self, MraError> {
        Self::ALL
            .into_iter()
            .find(|c| c.name() == name)
            .ok_or_else(|| MraError::UnknownBoundaryName(name.to_string()))
    }

    /// Constraint on the value (zero or prescribed).
    pub fn is_value_type(self) -> bool {
        matches!(self, BoundaryCode::Zero | BoundaryCode::Dirichlet)
    }

    /// Codes that carry a prescribed boundary function.
    pub fn has_prescribed_value(self) -> bool {
        matches!(self, BoundaryCode::Dirichlet | BoundaryCode::NonzeroDerivative)
    }
}

impl TryFrom<i32> for BoundaryCode {
    type Error = MraError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        usize::try_from(code)
            .ok()
            .and_then(|c| Self::ALL.get(c).copied())
            .ok_or(MraError::InvalidBoundaryCode(code))
    }
}

impl fmt::Display for BoundaryCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Side of an axis.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    Left = 0,
    Right = 1,
}

/// Boundary conditions for every axis of a `D`-dimensional domain.
#[derive(Clone, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "Vec<[BoundaryCode; 2]>", into = "Vec<[BoundaryCode; 2]>")]
pub struct BoundaryConds<const D: usize> {
    codes: [[BoundaryCode; 2]; D],
}

impl<const D: usize> BoundaryConds<D> {
    /// Same code on every side of every axis.
    ///
    /// Any single code is consistent, since it pairs periodic with periodic.
    pub fn uniform(code: BoundaryCode) -> Self {
        Self {
            codes: [[code; 2]; D],
        }
    }

    /// All sides periodic.
    pub fn periodic() -> Self {
        Self::uniform(BoundaryCode::Periodic)
    }

    /// All sides unconstrained.
    pub fn free() -> Self {
        Self::uniform(BoundaryCode::Free)
    }

    /// Build from a typed matrix, validating periodic pairing.
    pub fn new(codes: [[BoundaryCode; 2]; D]) -> Result<Self, MraError> {
        Self::validate(&codes)?;
        Ok(Self { codes })
    }

    /// Build from raw integer codes, one row per axis.
    ///
    /// Fails on the wrong number of rows, rows without exactly two entries,
    /// codes outside `0..=5`, or a half-periodic axis.
    pub fn from_codes<R: AsRef<[i32]>>(rows: &[R]) -> Result<Self, MraError> {
        if rows.len() != D {
            return Err(MraError::BoundaryShape {
                expected: D,
                rows: rows.len(),
                detail: "wrong number of axes".into(),
            });
        }
        let mut codes = [[BoundaryCode::Zero; 2]; D];
        for (axis, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            if row.len() != 2 {
                return Err(MraError::BoundaryShape {
                    expected: D,
                    rows: rows.len(),
                    detail: format!("axis {axis} has {} sides", row.len()),
                });
            }
            codes[axis] = [
                BoundaryCode::try_from(row[0])?,
                BoundaryCode::try_from(row[1])?,
            ];
        }
        Self::new(codes)
    }

    fn validate(codes: &[[BoundaryCode; 2]; D]) -> Result<(), MraError> {
        for (axis, [left, right]) in codes.iter().enumerate() {
            let lp = *left == BoundaryCode::Periodic;
            let rp = *right == BoundaryCode::Periodic;
            if lp != rp {
                return Err(MraError::UnpairedPeriodic { axis });
            }
        }
        Ok(())
    }

    fn check_axis(axis: usize) -> Result<(), MraError> {
        if axis < D {
            Ok(())
        } else {
            Err(MraError::InvalidAxis { axis, ndim: D })
        }
    }

    /// Code on `side` of `axis`.
    pub fn get(&self, axis: usize, side: Side) -> Result<BoundaryCode, MraError> {
        Self::check_axis(axis)?;
        Ok(self.codes[axis][side as usize])
    }

    /// `(left, right)` codes of `axis`.
    pub fn axis(&self, axis: usize) -> Result<(BoundaryCode, BoundaryCode), MraError> {
        Self::check_axis(axis)?;
        let [l, r] = self.codes[axis];
        Ok((l, r))
    }

    /// Replace one code. Leaves `self` untouched if the result would be inconsistent.
    pub fn set(&mut self, axis: usize, side: Side, code: BoundaryCode) -> Result<(), MraError> {
        Self::check_axis(axis)?;
        let mut next = self.codes;
        next[axis][side as usize] = code;
        Self::validate(&next)?;
        self.codes = next;
        Ok(())
    }

    /// Replace both codes of an axis at once.
    pub fn set_axis(
        &mut self,
        axis: usize,
        left: BoundaryCode,
        right: BoundaryCode,
    ) -> Result<(), MraError> {
        Self::check_axis(axis)?;
        let mut next = self.codes;
        next[axis] = [left, right];
        Self::validate(&next)?;
        self.codes = next;
        Ok(())
    }

    /// Raw integer matrix.
    pub fn as_codes(&self) -> Vec<[i32; 2]> {
        self.codes
            .iter()
            .map(|[l, r]| [l.code(), r.code()])
            .collect()
    }
}

impl<const D: usize> Default for BoundaryConds<D> {
    fn default() -> Self {
        Self::periodic()
    }
}

impl<const D: usize> TryFrom<Vec<[BoundaryCode; 2]>> for BoundaryConds<D> {
    type Error = MraError;

    fn try_from(rows: Vec<[BoundaryCode; 2]>) -> Result<Self, Self::Error> {
        let n = rows.len();
        let codes: [[BoundaryCode; 2]; D] =
            rows.try_into().map_err(|_| MraError::BoundaryShape {
                expected: D,
                rows: n,
                detail: "wrong number of axes".into(),
            })?;
        Self::new(codes)
    }
}

impl<const D: usize> From<BoundaryConds<D>> for Vec<[BoundaryCode; 2]> {
    fn from(bc: BoundaryConds<D>) -> Self {
        bc.codes.to_vec()
    }
}

impl<const D: usize> fmt::Display for BoundaryConds<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BoundaryConditions(")?;
        for (axis, [l, r]) in self.codes.iter().enumerate() {
            if axis > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{l}:{r}")?;
        }
        write!(f, ")")
    }
}
