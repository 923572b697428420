//! Bottom-up traversal of the model.
//!
//! Every node has an `accept` method that first accepts all of its children, collecting their
//! results in declaration order, and then hands itself together with those results to the
//! matching `visit_*` method. A visitor therefore never sees raw children, only their already
//! produced values.

use crate::{
    function::Function,
    module::{Module, ModuleComponent},
    parameter::Parameter,
    service::Service,
    types::{AliasType, BasicType, Type},
};

pub trait Visitor {
    type TypeValue;
    /// `children` are the results for [`BasicType::children()`], in order.
    fn visit_basic_type(&mut self, basic: &BasicType, children: Vec<Self::TypeValue>)
        -> Self::TypeValue;
    fn visit_alias_type(&mut self, alias: &AliasType, aliased: Self::TypeValue) -> Self::TypeValue;

    type ParameterValue;
    fn visit_parameter(
        &mut self,
        parameter: &Parameter,
        type_: Self::TypeValue,
    ) -> Self::ParameterValue;

    type FunctionValue;
    fn visit_function(
        &mut self,
        function: &Function,
        inputs: Vec<Self::ParameterValue>,
        outputs: Vec<Self::ParameterValue>,
    ) -> Self::FunctionValue;

    type ModuleValue;
    fn visit_module(
        &mut self,
        module: &Module,
        components: Vec<Visited<Self::FunctionValue, Self::TypeValue>>,
    ) -> Self::ModuleValue;

    type ServiceValue;
    fn visit_service(
        &mut self,
        service: &Service,
        modules: Vec<Self::ModuleValue>,
    ) -> Self::ServiceValue;
}

/// Result of accepting one module component.
#[derive(Clone, Debug, PartialEq)]
pub enum Visited<F, T> {
    Function(F),
    Typedef(T),
}

impl Type {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::TypeValue {
        match self {
            Self::Basic(basic) => basic.accept(visitor),
            Self::Alias(alias) => alias.accept(visitor),
        }
    }
}

impl BasicType {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::TypeValue {
        let children = self.children().into_iter().map(|c| c.accept(visitor)).collect();
        visitor.visit_basic_type(self, children)
    }
}

impl AliasType {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::TypeValue {
        let aliased = self.aliased.accept(visitor);
        visitor.visit_alias_type(self, aliased)
    }
}

impl Parameter {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::ParameterValue {
        let type_ = self.type_.accept(visitor);
        visitor.visit_parameter(self, type_)
    }
}

impl Function {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::FunctionValue {
        let inputs = self.inputs.iter().map(|p| p.accept(visitor)).collect();
        let outputs = self.outputs.iter().map(|p| p.accept(visitor)).collect();
        visitor.visit_function(self, inputs, outputs)
    }
}

impl ModuleComponent {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> Visited<V::FunctionValue, V::TypeValue> {
        match self {
            Self::Function(function) => Visited::Function(function.accept(visitor)),
            Self::Typedef(alias) => Visited::Typedef(alias.accept(visitor)),
        }
    }
}

impl Module {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::ModuleValue {
        let components = self.components.iter().map(|c| c.accept(visitor)).collect();
        visitor.visit_module(self, components)
    }
}

impl Service {
    pub fn accept<V: Visitor>(&self, visitor: &mut V) -> V::ServiceValue {
        let modules = self.modules.iter().map(|m| m.accept(visitor)).collect();
        visitor.visit_service(self, modules)
    }
}
