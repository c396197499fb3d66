//! `<include>` expansion
//!
//! Expansion builds a new tree: every node of the input maps to zero or more
//! output nodes, and an `<include>` maps to the expanded children of the
//! fragment it names. Registered fragments are only ever read.
//!
//! `${}` substitution applies only to content that came from a fragment, and
//! only when variables are in scope. The statement's own text is left for the
//! language driver.

use super::namespace::Namespace;
use super::registry::FragmentRegistry;
use crate::error::{Error, Result};
use crate::parsing::{PlaceholderResolver, VariableContext};
use crate::xml::{Element, Node};
use tracing::trace;

const INCLUDE: &str = "include";

/// Expands `<include refid="...">` references within one statement
pub struct IncludeExpander<'a> {
    namespace: &'a Namespace,
    fragments: &'a dyn FragmentRegistry,
    resolver: &'a PlaceholderResolver,
    /// Qualified ids of the fragments currently being expanded
    stack: Vec<String>,
}

impl<'a> IncludeExpander<'a> {
    pub fn new(
        namespace: &'a Namespace,
        fragments: &'a dyn FragmentRegistry,
        resolver: &'a PlaceholderResolver,
    ) -> Self {
        Self {
            namespace,
            fragments,
            resolver,
            stack: Vec::new(),
        }
    }

    /// Expand every include below `root`, seeding the scope with `globals`
    pub fn expand(&mut self, root: &Element, globals: &VariableContext) -> Result<Element> {
        self.stack.clear();
        self.expand_element(root, globals, false)
    }

    fn expand_element(
        &mut self,
        element: &Element,
        variables: &VariableContext,
        included: bool,
    ) -> Result<Element> {
        let substitute = included && !variables.is_empty();

        let mut attributes = element.attributes.clone();
        if substitute {
            for value in attributes.values_mut() {
                let resolved = self.resolver.resolve(value, variables)?.into_owned();
                *value = resolved;
            }
        }

        let mut children = Vec::with_capacity(element.children.len());
        for child in &element.children {
            self.expand_node(child, variables, included, &mut children)?;
        }

        Ok(Element {
            name: element.name.clone(),
            attributes,
            children,
        })
    }

    fn expand_node(
        &mut self,
        node: &Node,
        variables: &VariableContext,
        included: bool,
        out: &mut Vec<Node>,
    ) -> Result<()> {
        let substitute = included && !variables.is_empty();
        match node {
            Node::Element(element) if element.name == INCLUDE => {
                self.expand_include(element, variables, out)?;
            }
            Node::Element(element) => {
                out.push(Node::Element(self.expand_element(element, variables, included)?));
            }
            Node::Text(text) if substitute => {
                out.push(Node::Text(self.resolver.resolve(text, variables)?.into_owned()));
            }
            Node::CData(text) if substitute => {
                out.push(Node::CData(self.resolver.resolve(text, variables)?.into_owned()));
            }
            other => out.push(other.clone()),
        }
        Ok(())
    }

    fn expand_include(
        &mut self,
        include: &Element,
        variables: &VariableContext,
        out: &mut Vec<Node>,
    ) -> Result<()> {
        let refid = include.required_attr("refid")?;
        let refid = self.resolver.resolve(refid, variables)?;
        let refid = self.namespace.apply(&refid, true)?;

        if self.stack.contains(&refid) {
            let mut chain = self.stack.clone();
            chain.push(refid);
            return Err(Error::CyclicInclude { chain });
        }

        let fragments = self.fragments;
        let fragment = fragments
            .fragment(&refid)
            .ok_or_else(|| Error::FragmentNotFound {
                refid: refid.clone(),
            })?;

        let declared = declared_properties(include)?;
        let scope = variables.derive(&refid, &declared, self.resolver)?;
        trace!(refid = %refid, variables = scope.len(), "expanding include");

        self.stack.push(refid);
        let expanded = self.expand_element(fragment, &scope, true);
        self.stack.pop();

        // The fragment wrapper itself is dropped; its children take the include's place
        out.extend(expanded?.children);
        Ok(())
    }
}

/// `<property name=".." value=".."/>` children of an include, in order
fn declared_properties(include: &Element) -> Result<Vec<(String, String)>> {
    include
        .elements()
        .map(|property| {
            Ok((
                property.required_attr("name")?.to_string(),
                property.required_attr("value")?.to_string(),
            ))
        })
        .collect()
}
