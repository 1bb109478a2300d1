//! Code for solving the assembled problem with HiGHS.
use crate::log::LOG_LEVEL_ENV_VAR;
use crate::registry::{IndexKey, LinearExpr, ModelRegistry};
use anyhow::{Context, Result, anyhow};
use highs::{HighsModelStatus, RowProblem as Problem, Sense};
use log::{debug, info};

/// The solution to the optimisation problem.
///
/// Values are looked up by component name and index, using the registry the problem was built
/// from.
pub struct Solution<'a> {
    registry: &'a ModelRegistry,
    values: Vec<f64>,
}

impl<'a> Solution<'a> {
    /// Create a [`Solution`] from the value of each column
    fn new(registry: &'a ModelRegistry, values: Vec<f64>) -> Self {
        Self { registry, values }
    }

    /// The registry the problem was built from
    pub fn registry(&self) -> &'a ModelRegistry {
        self.registry
    }

    /// The value of every column, indexed by variable
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// The value of the variable with the given name and index
    pub fn value(&self, name: &str, key: &IndexKey) -> Result<f64> {
        let var = self.registry.variable(name, key)?;
        Ok(self.values[var.index()])
    }

    /// Evaluate an expression at the solution
    pub fn evaluate(&self, expr: &LinearExpr) -> f64 {
        expr.evaluate(&self.values)
    }

    /// The value of the named expression at the given index
    pub fn expression_value(&self, name: &str, key: &IndexKey) -> Result<f64> {
        Ok(self.evaluate(self.registry.expression(name, key)?))
    }

    /// The value of the objective at the solution
    pub fn objective_value(&self) -> f64 {
        self.registry
            .objective()
            .map_or(0.0, |objective| self.evaluate(objective))
    }

    /// Iterate over the values of every variable in the named block
    pub fn iter_variable_values(
        &self,
        name: &str,
    ) -> Result<impl Iterator<Item = (&IndexKey, f64)>> {
        let block = self.registry.variable_block(name)?;
        Ok(block
            .iter()
            .map(|(key, var)| (key, self.values[var.index()])))
    }
}

/// Solve the problem held in the registry, minimising its objective.
///
/// # Arguments
///
/// * `registry` - A registry whose objective has been set
///
/// # Returns
///
/// The optimal solution, or an error if the problem could not be solved to optimality (e.g.
/// because it is infeasible or unbounded).
pub fn solve(registry: &ModelRegistry) -> Result<Solution<'_>> {
    let objective = registry
        .objective()
        .context("Cannot solve a problem without an objective")?;

    // Objective coefficients per column. The constant term has no effect on the solution.
    let mut costs = vec![0.0; registry.num_columns()];
    for (var, coeff) in objective.iter_terms() {
        costs[var.index()] += coeff;
    }

    let mut problem = Problem::default();
    let columns: Vec<_> = registry
        .column_bounds()
        .iter()
        .zip(costs)
        .map(|(bounds, cost)| problem.add_column(cost, bounds.lower..=bounds.upper))
        .collect();

    let mut num_rows = 0;
    for constraint in registry.iter_constraints() {
        let bounds = constraint.row_bounds();
        problem.add_row(
            bounds.lower..=bounds.upper,
            constraint
                .expr()
                .iter_terms()
                .map(|(var, coeff)| (columns[var.index()], coeff)),
        );
        num_rows += 1;
    }
    debug!(
        "Passing problem with {} columns and {num_rows} rows to HiGHS",
        columns.len()
    );

    let mut highs_model = problem.optimise(Sense::Minimise);
    enable_highs_logging(&mut highs_model);

    let solved = highs_model.solve();
    match solved.status() {
        HighsModelStatus::Optimal => {
            let solution = Solution::new(registry, solved.get_solution().columns().to_vec());
            info!(
                "Found optimal solution with total cost {}",
                solution.objective_value()
            );
            Ok(solution)
        }
        status => Err(anyhow!("Could not solve: {status:?}")),
    }
}

/// Enable logging for the HiGHS solver
fn enable_highs_logging(model: &mut highs::Model) {
    // Skip this step if logging is disabled (e.g. when running tests)
    if let Ok(log_level) = std::env::var(LOG_LEVEL_ENV_VAR) {
        if log_level.eq_ignore_ascii_case("off") {
            return;
        }
    }

    model.set_option("log_to_console", true);
    model.set_option("output_flag", true);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::{Bounds, Constraint, index_key};
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_solve() {
        // Minimise x + 2y subject to x + y >= 3, y >= 1
        let mut registry = ModelRegistry::new(false);
        registry
            .add_variables(
                "x",
                &[],
                [(IndexKey::default(), Bounds::non_negative())],
            )
            .unwrap();
        registry
            .add_variables(
                "y",
                &[],
                [(IndexKey::default(), Bounds::new(1.0, f64::INFINITY))],
            )
            .unwrap();
        let x = registry.variable("x", &IndexKey::default()).unwrap();
        let y = registry.variable("y", &IndexKey::default()).unwrap();
        registry
            .add_constraints(
                "min_total",
                &[],
                [(
                    IndexKey::default(),
                    Constraint::ge(LinearExpr::from(x) + y, 3.0),
                )],
            )
            .unwrap();
        registry
            .set_objective(LinearExpr::from(x) + LinearExpr::from(y) * 2.0)
            .unwrap();

        let solution = solve(&registry).unwrap();
        assert_approx_eq!(f64, solution.value("x", &index_key!()).unwrap(), 2.0, epsilon = 1e-7);
        assert_approx_eq!(f64, solution.value("y", &index_key!()).unwrap(), 1.0, epsilon = 1e-7);
        assert_approx_eq!(f64, solution.objective_value(), 4.0, epsilon = 1e-7);
    }

    #[test]
    fn test_solve_infeasible() {
        let mut registry = ModelRegistry::new(false);
        registry
            .add_variables(
                "x",
                &[],
                [(IndexKey::default(), Bounds::new(0.0, 1.0))],
            )
            .unwrap();
        let x = registry.variable("x", &IndexKey::default()).unwrap();
        registry
            .add_constraints(
                "too_big",
                &[],
                [(IndexKey::default(), Constraint::ge(x, 2.0))],
            )
            .unwrap();
        registry.set_objective(LinearExpr::from(x)).unwrap();

        assert!(solve(&registry).is_err());
    }

    #[test]
    fn test_solve_no_objective() {
        let registry = ModelRegistry::new(false);
        assert!(solve(&registry).is_err());
    }
}
