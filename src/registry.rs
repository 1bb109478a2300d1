//! The model registry holds every component of the optimisation problem as it is assembled.
//!
//! Components are stored in named blocks (e.g. `DispatchGen`), each of which maps an
//! [`IndexKey`] to an entry. Modules also register the names of components which contribute to
//! the power balance and to the objective, so that these can be summed once every module has been
//! added.
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexMap;
use indexmap::map::Entry;

mod expression;
mod index;
pub use expression::{Bounds, Constraint, LinearExpr, Relation, Variable};
pub(crate) use index::index_key;
pub use index::{IndexElement, IndexKey};

/// A named block of indexed entries
#[derive(Debug, Clone, PartialEq)]
pub struct Block<T> {
    name: &'static str,
    index_names: Vec<&'static str>,
    entries: IndexMap<IndexKey, T>,
}

impl<T> Block<T> {
    fn new(name: &'static str, index_names: &[&'static str]) -> Self {
        Self {
            name,
            index_names: index_names.to_vec(),
            entries: IndexMap::new(),
        }
    }

    fn insert(&mut self, key: IndexKey, value: T) -> Result<()> {
        ensure!(
            key.len() == self.index_names.len(),
            "Index {key} for {} has the wrong number of elements (expected {})",
            self.name,
            self.index_names.len()
        );
        match self.entries.entry(key) {
            Entry::Vacant(entry) => {
                entry.insert(value);
                Ok(())
            }
            Entry::Occupied(entry) => bail!("Duplicate index {} for {}", entry.key(), self.name),
        }
    }

    /// The name of the block
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// The names of the index sets (e.g. `["GENERATION_PROJECT", "TIMEPOINT"]`)
    pub fn index_names(&self) -> &[&'static str] {
        &self.index_names
    }

    /// Get the entry with the given index
    pub fn get(&self, key: &IndexKey) -> Option<&T> {
        self.entries.get(key)
    }

    /// Iterate over the entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&IndexKey, &T)> {
        self.entries.iter()
    }

    /// The number of entries in the block
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the block has no entries
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Names of components which make up one side of a power balance or the objective
pub type ComponentList = Vec<&'static str>;

/// The explicit model-assembly context passed through every builder.
///
/// Variables are assigned columns in the order in which they are added.
#[derive(Debug, Default)]
pub struct ModelRegistry {
    columns: Vec<Bounds>,
    variables: IndexMap<&'static str, Block<Variable>>,
    params: IndexMap<&'static str, Block<f64>>,
    expressions: IndexMap<&'static str, Block<LinearExpr>>,
    constraints: IndexMap<&'static str, Block<Constraint>>,
    zone_power_injections: ComponentList,
    zone_power_withdrawals: ComponentList,
    distributed_power_withdrawals: Option<ComponentList>,
    cost_components_per_tp: ComponentList,
    cost_components_per_period: ComponentList,
    objective: Option<LinearExpr>,
}

impl ModelRegistry {
    /// Create a new, empty registry.
    ///
    /// # Arguments
    ///
    /// * `with_distribution_node` - Whether to create an accumulator for withdrawals at the
    ///   distribution node
    pub fn new(with_distribution_node: bool) -> Self {
        Self {
            distributed_power_withdrawals: with_distribution_node.then(Vec::new),
            ..Self::default()
        }
    }

    /// Whether any kind of component with this name exists
    pub fn has_component(&self, name: &str) -> bool {
        self.variables.contains_key(name)
            || self.params.contains_key(name)
            || self.expressions.contains_key(name)
            || self.constraints.contains_key(name)
    }

    fn check_new_name(&self, name: &str) -> Result<()> {
        ensure!(
            !self.has_component(name),
            "A component called {name} already exists"
        );

        Ok(())
    }

    /// Add a block of variables.
    ///
    /// # Arguments
    ///
    /// * `name` - Name of the block
    /// * `index_names` - The names of the sets indexing the block
    /// * `entries` - The index and bounds for each variable
    pub fn add_variables<I>(
        &mut self,
        name: &'static str,
        index_names: &[&'static str],
        entries: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (IndexKey, Bounds)>,
    {
        self.check_new_name(name)?;
        let mut block = Block::new(name, index_names);
        for (key, bounds) in entries {
            ensure!(
                !bounds.lower.is_nan() && !bounds.upper.is_nan() && bounds.lower <= bounds.upper,
                "Invalid bounds [{}, {}] for {name}{key}",
                bounds.lower,
                bounds.upper
            );
            let var = Variable(self.columns.len());
            block.insert(key, var)?;
            self.columns.push(bounds);
        }
        self.variables.insert(name, block);

        Ok(())
    }

    /// Add a block of parameters
    pub fn add_params<I>(
        &mut self,
        name: &'static str,
        index_names: &[&'static str],
        entries: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (IndexKey, f64)>,
    {
        self.check_new_name(name)?;
        let mut block = Block::new(name, index_names);
        for (key, value) in entries {
            block.insert(key, value)?;
        }
        self.params.insert(name, block);

        Ok(())
    }

    /// Add a block of derived expressions
    pub fn add_expressions<I>(
        &mut self,
        name: &'static str,
        index_names: &[&'static str],
        entries: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (IndexKey, LinearExpr)>,
    {
        self.check_new_name(name)?;
        let mut block = Block::new(name, index_names);
        for (key, expr) in entries {
            block.insert(key, expr)?;
        }
        self.expressions.insert(name, block);

        Ok(())
    }

    /// Add a block of constraints
    pub fn add_constraints<I>(
        &mut self,
        name: &'static str,
        index_names: &[&'static str],
        entries: I,
    ) -> Result<()>
    where
        I: IntoIterator<Item = (IndexKey, Constraint)>,
    {
        self.check_new_name(name)?;
        let mut block = Block::new(name, index_names);
        for (key, constraint) in entries {
            block.insert(key, constraint)?;
        }
        self.constraints.insert(name, block);

        Ok(())
    }

    /// Get the variable with the given name and index
    pub fn variable(&self, name: &str, key: &IndexKey) -> Result<Variable> {
        let block = self.variable_block(name)?;
        block
            .get(key)
            .copied()
            .with_context(|| format!("No variable {name}{key}"))
    }

    /// Get the parameter with the given name and index
    pub fn param(&self, name: &str, key: &IndexKey) -> Result<f64> {
        let block = self.param_block(name)?;
        block
            .get(key)
            .copied()
            .with_context(|| format!("No parameter {name}{key}"))
    }

    /// Get the expression with the given name and index
    pub fn expression(&self, name: &str, key: &IndexKey) -> Result<&LinearExpr> {
        let block = self.expression_block(name)?;
        block
            .get(key)
            .with_context(|| format!("No expression {name}{key}"))
    }

    /// Get the value of a variable, parameter or expression as a [`LinearExpr`].
    ///
    /// This is used for summing registered components whose kind is not known in advance.
    pub fn term(&self, name: &str, key: &IndexKey) -> Result<LinearExpr> {
        if self.variables.contains_key(name) {
            Ok(self.variable(name, key)?.into())
        } else if self.params.contains_key(name) {
            Ok(self.param(name, key)?.into())
        } else if self.expressions.contains_key(name) {
            Ok(self.expression(name, key)?.clone())
        } else {
            bail!("Unknown component {name}")
        }
    }

    /// Get the block of variables with the given name
    pub fn variable_block(&self, name: &str) -> Result<&Block<Variable>> {
        self.variables
            .get(name)
            .with_context(|| format!("Unknown variable {name}"))
    }

    /// Get the block of parameters with the given name
    pub fn param_block(&self, name: &str) -> Result<&Block<f64>> {
        self.params
            .get(name)
            .with_context(|| format!("Unknown parameter {name}"))
    }

    /// Get the block of expressions with the given name
    pub fn expression_block(&self, name: &str) -> Result<&Block<LinearExpr>> {
        self.expressions
            .get(name)
            .with_context(|| format!("Unknown expression {name}"))
    }

    /// Get the block of constraints with the given name
    pub fn constraint_block(&self, name: &str) -> Result<&Block<Constraint>> {
        self.constraints
            .get(name)
            .with_context(|| format!("Unknown constraint {name}"))
    }

    /// Iterate over the variable blocks
    pub fn iter_variable_blocks(&self) -> impl Iterator<Item = &Block<Variable>> {
        self.variables.values()
    }

    /// Iterate over the expression blocks
    pub fn iter_expression_blocks(&self) -> impl Iterator<Item = &Block<LinearExpr>> {
        self.expressions.values()
    }

    /// Iterate over the constraint blocks
    pub fn iter_constraint_blocks(&self) -> impl Iterator<Item = &Block<Constraint>> {
        self.constraints.values()
    }

    /// Iterate over every constraint in every block
    pub fn iter_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints
            .values()
            .flat_map(|block| block.entries.values())
    }

    /// The bounds of each variable, indexed by column
    pub fn column_bounds(&self) -> &[Bounds] {
        &self.columns
    }

    /// The total number of variables
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    fn check_registrable(&self, name: &str) -> Result<()> {
        ensure!(
            self.variables.contains_key(name)
                || self.params.contains_key(name)
                || self.expressions.contains_key(name),
            "Cannot register unknown component {name}"
        );

        Ok(())
    }

    /// Register a component as a power injection at the zonal node
    pub fn register_zone_injection(&mut self, name: &'static str) -> Result<()> {
        self.check_registrable(name)?;
        self.zone_power_injections.push(name);

        Ok(())
    }

    /// Register a component as a power withdrawal at the zonal node
    pub fn register_zone_withdrawal(&mut self, name: &'static str) -> Result<()> {
        self.check_registrable(name)?;
        self.zone_power_withdrawals.push(name);

        Ok(())
    }

    /// Register a component as a power withdrawal at the distribution node, if there is one.
    ///
    /// Otherwise the component is registered at the zonal node.
    pub fn register_withdrawal(&mut self, name: &'static str) -> Result<()> {
        self.check_registrable(name)?;
        match self.distributed_power_withdrawals_mut() {
            Some(withdrawals) => withdrawals.push(name),
            None => self.zone_power_withdrawals.push(name),
        }

        Ok(())
    }

    /// Register a component as a cost incurred in each timepoint
    pub fn register_cost_per_tp(&mut self, name: &'static str) -> Result<()> {
        self.check_registrable(name)?;
        self.cost_components_per_tp.push(name);

        Ok(())
    }

    /// Register a component as a cost incurred in each period
    pub fn register_cost_per_period(&mut self, name: &'static str) -> Result<()> {
        self.check_registrable(name)?;
        self.cost_components_per_period.push(name);

        Ok(())
    }

    /// Components injecting power at each zonal node
    pub fn zone_power_injections(&self) -> &[&'static str] {
        &self.zone_power_injections
    }

    /// Components withdrawing power at each zonal node
    pub fn zone_power_withdrawals(&self) -> &[&'static str] {
        &self.zone_power_withdrawals
    }

    /// Components withdrawing power at the distribution node, if one exists
    pub fn distributed_power_withdrawals(&self) -> Option<&[&'static str]> {
        self.distributed_power_withdrawals.as_deref()
    }

    /// Mutable access to the distribution node's withdrawals, if one exists
    pub fn distributed_power_withdrawals_mut(&mut self) -> Option<&mut ComponentList> {
        self.distributed_power_withdrawals.as_mut()
    }

    /// Components which are a cost in each timepoint
    pub fn cost_components_per_tp(&self) -> &[&'static str] {
        &self.cost_components_per_tp
    }

    /// Components which are a cost in each period
    pub fn cost_components_per_period(&self) -> &[&'static str] {
        &self.cost_components_per_period
    }

    /// Set the expression to be minimised
    pub fn set_objective(&mut self, objective: LinearExpr) -> Result<()> {
        ensure!(self.objective.is_none(), "The objective has already been set");
        self.objective = Some(objective);

        Ok(())
    }

    /// The expression to be minimised, if it has been set
    pub fn objective(&self) -> Option<&LinearExpr> {
        self.objective.as_ref()
    }
}
