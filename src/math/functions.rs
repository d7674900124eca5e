#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum FunctionChoice {
    Paraboloid,
    Ripple,
    SaddleHyperbolic,
}

pub struct SurfaceFunction {
    pub choice: FunctionChoice,
    pub name: &'static str,
    pub description: &'static str,
    pub formula: &'static str,
    pub eval: fn(f64, f64) -> f64,
}

pub struct LevelFunction {
    pub name: &'static str,
    pub formula: &'static str,
    pub eval: fn(f64, f64, f64) -> f64,
}

fn paraboloid(x: f64, y: f64) -> f64 {
    x * x + y * y
}

fn ripple(x: f64, y: f64) -> f64 {
    (x * x + y * y).sqrt().sin()
}

fn saddle(x: f64, y: f64) -> f64 {
    x * x - y * y
}

fn squared_norm(x: f64, y: f64, z: f64) -> f64 {
    x * x + y * y + z * z
}

/// Indexed by `FunctionChoice as usize`.
pub const SURFACE_FUNCTIONS: &[SurfaceFunction] = &[
    SurfaceFunction {
        choice: FunctionChoice::Paraboloid,
        name: "Simple: Paraboloid (x^2 + y^2)",
        description: "Bowl opening upwards, circular level curves",
        formula: "z = x² + y²",
        eval: paraboloid,
    },
    SurfaceFunction {
        choice: FunctionChoice::Ripple,
        name: "Complex: Ripple (sin(sqrt(x^2 + y^2)))",
        description: "Radial wave, concentric rings of equal height",
        formula: "z = sin(√(x² + y²))",
        eval: ripple,
    },
    SurfaceFunction {
        choice: FunctionChoice::SaddleHyperbolic,
        name: "Saddle: Hyperbolic Paraboloid (x^2 - y^2)",
        description: "Rises along x, falls along y, hyperbolic level curves",
        formula: "z = x² − y²",
        eval: saddle,
    },
];

pub const LEVEL_FUNCTION: LevelFunction = LevelFunction {
    name: "Sphere family",
    formula: "w = x² + y² + z²",
    eval: squared_norm,
};

impl FunctionChoice {
    pub fn function(self) -> &'static SurfaceFunction {
        &SURFACE_FUNCTIONS[self as usize]
    }

    #[inline]
    pub fn eval(self, x: f64, y: f64) -> f64 {
        (self.function().eval)(x, y)
    }
}

impl LevelFunction {
    #[inline]
    pub fn eval(&self, x: f64, y: f64, z: f64) -> f64 {
        (self.eval)(x, y, z)
    }

    /// Display string for the level surface `f(x, y, z) = k`.
    pub fn formula_at(&self, k: f64) -> String {
        format!("{} = {}", self.formula, k)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn table_is_indexed_by_choice() {
        assert_eq!(SURFACE_FUNCTIONS.len(), 3);
        for function in SURFACE_FUNCTIONS {
            assert!(std::ptr::eq(function.choice.function(), function));
        }
    }

    #[test]
    fn formulas_evaluate_as_named() {
        assert_eq!(FunctionChoice::Paraboloid.eval(3.0, 4.0), 25.0);
        assert_eq!(FunctionChoice::SaddleHyperbolic.eval(3.0, 4.0), -7.0);
        assert_relative_eq!(FunctionChoice::Ripple.eval(3.0, 4.0), 5.0_f64.sin());
        assert_eq!(LEVEL_FUNCTION.eval(1.0, 2.0, 2.0), 9.0);
    }

    #[test]
    fn level_formula_includes_constant() {
        assert_eq!(LEVEL_FUNCTION.formula_at(9.0), "w = x² + y² + z² = 9");
    }
}
