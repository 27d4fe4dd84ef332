//! Graph node: a junction variable pair (pressure, flow).

use zd_core::NodeId;

use crate::dofhandler::DofHandler;

/// A node in the 0D network: one pressure DOF and one flow DOF.
///
/// Nodes hold no governing-equation behavior of their own — that lives in
/// the blocks that reference them via `inlet_nodes`/`outlet_nodes`. Both
/// DOFs are registered with the `DofHandler` at node-creation time, before
/// any block's `setup_dofs` runs, so a block can read `pres_dof`/`flow_dof`
/// directly off the nodes it was constructed with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub pres_dof: usize,
    pub flow_dof: usize,
}

impl Node {
    /// Register a new node's two DOFs with `dofhandler` and construct it.
    pub fn register(id: NodeId, name: impl Into<String>, dofhandler: &mut DofHandler) -> Self {
        let name = name.into();
        let pres_dof = dofhandler.register_variable(format!("{name}:P"));
        let flow_dof = dofhandler.register_variable(format!("{name}:Q"));
        Self {
            id,
            name,
            pres_dof,
            flow_dof,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_assigns_consecutive_dofs() {
        let mut dh = DofHandler::new();
        let n = Node::register(NodeId::from_index(0), "N1", &mut dh);
        assert_eq!(n.pres_dof, 0);
        assert_eq!(n.flow_dof, 1);
        assert_eq!(dh.size(), 2);
    }
}
