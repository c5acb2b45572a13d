//! Twelve-variable physiological state with named-index access.

use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};

/// Number of state variables
pub const STATE_DIM: usize = 12;

/// State variables in storage order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Variable {
    /// β-cell mass (B)
    BetaCells = 0,
    /// α-cell mass (A)
    AlphaCells = 1,
    /// GLP-1 (L)
    Glp1 = 2,
    /// Insulin (I)
    Insulin = 3,
    /// GLUT-2 density (U2)
    Glut2 = 4,
    /// GLUT-4 density (U4)
    Glut4 = 5,
    /// Glucagon (C)
    Glucagon = 6,
    /// Blood glucose (G)
    Glucose = 7,
    /// Stored liver glucose (G*)
    StoredGlucose = 8,
    /// TNF-α (Tα)
    TnfAlpha = 9,
    /// Oleic acid (O)
    OleicAcid = 10,
    /// Palmitic acid (P)
    PalmiticAcid = 11,
}

impl Variable {
    pub const ALL: [Variable; STATE_DIM] = [
        Variable::BetaCells,
        Variable::AlphaCells,
        Variable::Glp1,
        Variable::Insulin,
        Variable::Glut2,
        Variable::Glut4,
        Variable::Glucagon,
        Variable::Glucose,
        Variable::StoredGlucose,
        Variable::TnfAlpha,
        Variable::OleicAcid,
        Variable::PalmiticAcid,
    ];

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Model symbol
    pub fn symbol(self) -> &'static str {
        match self {
            Variable::BetaCells => "B",
            Variable::AlphaCells => "A",
            Variable::Glp1 => "L",
            Variable::Insulin => "I",
            Variable::Glut2 => "U2",
            Variable::Glut4 => "U4",
            Variable::Glucagon => "C",
            Variable::Glucose => "G",
            Variable::StoredGlucose => "G*",
            Variable::TnfAlpha => "Tα",
            Variable::OleicAcid => "O",
            Variable::PalmiticAcid => "P",
        }
    }
}

/// Concentrations and densities in native units (g/cm³)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StateVector(pub [f64; STATE_DIM]);

impl StateVector {
    pub fn zeros() -> Self {
        Self([0.0; STATE_DIM])
    }

    /// Copy from a slice of exactly [`STATE_DIM`] values
    pub fn from_slice(values: &[f64]) -> Option<Self> {
        let array: [f64; STATE_DIM] = values.try_into().ok()?;
        Some(Self(array))
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn as_mut_slice(&mut self) -> &mut [f64] {
        &mut self.0
    }

    pub fn beta_cells(&self) -> f64 {
        self[Variable::BetaCells]
    }

    pub fn alpha_cells(&self) -> f64 {
        self[Variable::AlphaCells]
    }

    pub fn glp1(&self) -> f64 {
        self[Variable::Glp1]
    }

    pub fn insulin(&self) -> f64 {
        self[Variable::Insulin]
    }

    pub fn glut2(&self) -> f64 {
        self[Variable::Glut2]
    }

    pub fn glut4(&self) -> f64 {
        self[Variable::Glut4]
    }

    pub fn glucagon(&self) -> f64 {
        self[Variable::Glucagon]
    }

    pub fn glucose(&self) -> f64 {
        self[Variable::Glucose]
    }

    pub fn stored_glucose(&self) -> f64 {
        self[Variable::StoredGlucose]
    }

    pub fn tnf_alpha(&self) -> f64 {
        self[Variable::TnfAlpha]
    }

    pub fn oleic_acid(&self) -> f64 {
        self[Variable::OleicAcid]
    }

    pub fn palmitic_acid(&self) -> f64 {
        self[Variable::PalmiticAcid]
    }

    /// Smallest component
    pub fn min_component(&self) -> f64 {
        self.0.iter().copied().fold(f64::INFINITY, f64::min)
    }

    /// True when every component is finite
    pub fn is_finite(&self) -> bool {
        self.0.iter().all(|v| v.is_finite())
    }

    /// First variable that is non-finite or negative
    pub fn first_invalid(&self) -> Option<Variable> {
        Variable::ALL
            .into_iter()
            .find(|&v| !self[v].is_finite() || self[v] < 0.0)
    }
}

impl Index<Variable> for StateVector {
    type Output = f64;

    #[inline]
    fn index(&self, var: Variable) -> &f64 {
        &self.0[var.index()]
    }
}

impl IndexMut<Variable> for StateVector {
    #[inline]
    fn index_mut(&mut self, var: Variable) -> &mut f64 {
        &mut self.0[var.index()]
    }
}
