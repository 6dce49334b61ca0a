use crate::plan::PlanRef;

/// The enclosing plan nodes of a subquery, innermost first. Empty for top-level statements.
#[derive(Debug, Clone, Default)]
pub struct Scope {
    nodes: Vec<PlanRef>,
}

impl Scope {
    pub fn new() -> Self {
        Self::default()
    }

    /// A scope nested one level deeper, inside `node`.
    pub fn new_scope(&self, node: PlanRef) -> Scope {
        let mut nodes = Vec::with_capacity(self.nodes.len() + 1);
        nodes.push(node);
        nodes.extend(self.nodes.iter().cloned());
        Scope { nodes }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[PlanRef] {
        &self.nodes
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::test_util::*;

    #[test]
    fn test_new_scope_puts_innermost_first() {
        let outer = mytable();
        let inner = othertable();
        let scope = Scope::new().new_scope(outer.clone()).new_scope(inner.clone());
        assert!(!scope.is_empty());
        assert!(Arc::ptr_eq(&scope.nodes()[0], &inner));
        assert!(Arc::ptr_eq(&scope.nodes()[1], &outer));
        assert!(Scope::new().is_empty());
    }
}
