//! Write a [`Problem`] in the CPLEX LP text format
//!
//! Ranged constraints are written as two rows, suffixed `_lower` and `_upper`, since
//! the format has no ranged rows. Variables with the default `[0, inf)` bounds are left
//! out of the `Bounds` section.
use std::fmt::{Display, Formatter, Result};

use crate::optimize::constraint::Constraint;
use crate::optimize::objective::ObjectiveSense;
use crate::optimize::problem::Problem;

impl Display for Problem {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        let ids: Vec<&str> = self.variables().map(|v| v.id.as_str()).collect();

        if let Some(name) = self.name() {
            writeln!(f, "\\ Problem name: {}", name)?;
        }

        // region Objective
        match self.objective() {
            Some(objective) => {
                let sense = match objective.sense() {
                    ObjectiveSense::Maximize => "Maximize",
                    ObjectiveSense::Minimize => "Minimize",
                };
                writeln!(f, "{}", sense)?;
                write!(f, " obj:")?;
                write_terms(
                    f,
                    objective
                        .terms()
                        .iter()
                        .map(|t| (ids[t.var.index()], t.coef)),
                )?;
                if objective.constant() != 0. {
                    write!(f, " {} {}", sign(objective.constant()), objective.constant().abs())?;
                }
                writeln!(f)?;
            }
            None => {
                writeln!(f, "Maximize")?;
                writeln!(f, " obj: 0")?;
            }
        }
        // endregion Objective

        // region Constraints
        writeln!(f, "Subject To")?;
        for constraint in self.constraints() {
            let terms = || {
                constraint
                    .get_terms()
                    .iter()
                    .map(|t| (ids[t.variable.index()], t.coefficient))
            };
            match constraint {
                Constraint::Equality { id, equals, .. } => {
                    write!(f, " {}:", id)?;
                    write_terms(f, terms())?;
                    writeln!(f, " = {}", equals)?;
                }
                Constraint::Inequality {
                    id,
                    lower_bound,
                    upper_bound,
                    ..
                } => match (lower_bound.is_finite(), upper_bound.is_finite()) {
                    (true, true) => {
                        write!(f, " {}_lower:", id)?;
                        write_terms(f, terms())?;
                        writeln!(f, " >= {}", lower_bound)?;
                        write!(f, " {}_upper:", id)?;
                        write_terms(f, terms())?;
                        writeln!(f, " <= {}", upper_bound)?;
                    }
                    (true, false) => {
                        write!(f, " {}:", id)?;
                        write_terms(f, terms())?;
                        writeln!(f, " >= {}", lower_bound)?;
                    }
                    (false, true) => {
                        write!(f, " {}:", id)?;
                        write_terms(f, terms())?;
                        writeln!(f, " <= {}", upper_bound)?;
                    }
                    // Unbounded on both sides, nothing to enforce
                    (false, false) => {}
                },
            }
        }
        // endregion Constraints

        // region Bounds
        writeln!(f, "Bounds")?;
        for var in self.variables() {
            let (lower, upper) = (var.lower_bound, var.upper_bound);
            if var.is_fixed() {
                writeln!(f, " {} = {}", var.id, lower)?;
            } else if var.is_free() {
                writeln!(f, " {} free", var.id)?;
            } else if lower == 0. && upper == f64::INFINITY {
                continue;
            } else if upper == f64::INFINITY {
                writeln!(f, " {} >= {}", var.id, lower)?;
            } else if lower == f64::NEG_INFINITY {
                writeln!(f, " -inf <= {} <= {}", var.id, upper)?;
            } else {
                writeln!(f, " {} <= {} <= {}", lower, var.id, upper)?;
            }
        }
        // endregion Bounds

        writeln!(f, "End")
    }
}

fn sign(value: f64) -> char {
    if value < 0. {
        '-'
    } else {
        '+'
    }
}

fn write_terms<'a>(f: &mut Formatter<'_>, terms: impl Iterator<Item = (&'a str, f64)>) -> Result {
    let mut empty = true;
    for (id, coef) in terms {
        write!(f, " {} {} {}", sign(coef), coef.abs(), id)?;
        empty = false;
    }
    if empty {
        write!(f, " 0")?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::optimize::constraint::Relation;
    use crate::optimize::problem::Problem;

    #[test]
    fn writes_lp_format() {
        let mut problem = Problem::new();
        problem.set_name("small");
        let x = problem.declare_variable("x", 0., 3.).unwrap();
        let y = problem.declare_flux("y").unwrap();
        let t = problem.declare_free("t").unwrap();
        let m = problem.declare_bounded_below("m", 15.).unwrap();
        problem
            .add_constraint("c1", x + y, Relation::LessOrEqual, 4.)
            .unwrap();
        problem
            .add_constraint("link", t - 2. * x, Relation::Equal, 0.)
            .unwrap();
        problem
            .add_range_constraint("band", y + m, 1., 20.)
            .unwrap();
        problem.maximize(3. * x + 2. * y).unwrap();

        let text = problem.to_string();
        let expected = "\\ Problem name: small\n\
                        Maximize\n \
                        obj: + 3 x + 2 y\n\
                        Subject To\n \
                        c1: + 1 x + 1 y <= 4\n \
                        link: + 1 t - 2 x = 0\n \
                        band_lower: + 1 y + 1 m >= 1\n \
                        band_upper: + 1 y + 1 m <= 20\n\
                        Bounds\n \
                        0 <= x <= 3\n \
                        t free\n \
                        m >= 15\n\
                        End\n";
        assert_eq!(text, expected);
    }

    #[test]
    fn writes_missing_objective() {
        let mut problem = Problem::new();
        problem.declare_variable("x", 2., 2.).unwrap();
        let text = problem.to_string();
        assert!(text.starts_with("Maximize\n obj: 0\n"));
        assert!(text.contains(" x = 2\n"));
    }
}
