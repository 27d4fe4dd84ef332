//! Shared helpers used by every block variant.

use zd_graph::DofHandler;
use zd_graph::Node;
use zd_system::SystemError;

use crate::error::BlockError;

/// Wrap a [`SystemError`] raised while `block` was writing into the system
/// with the block name that caused it, for `?`-propagation into `ZdResult`.
pub fn sys_err(block: &str, source: SystemError) -> BlockError {
    BlockError::System {
        block: block.to_string(),
        source,
    }
}

/// Numerical floor below which a flow is treated as zero for the purposes of
/// the valve-state predicate and stenosis-coefficient sign logic.
pub const EPSILON_FLOW: f64 = 1e-9;

/// Shared DOF-declaration helper every block's `setup_dofs` calls.
///
/// Populates `global_var_ids` in a fixed order: each
/// inlet node's (pres_dof, flow_dof), then each outlet node's, then one
/// freshly registered variable per internal name. Populates `global_eqn_ids`
/// with `n_equations` freshly registered equation rows.
pub fn setup_dofs_(
    dofhandler: &mut DofHandler,
    inlet_nodes: &[Node],
    outlet_nodes: &[Node],
    n_equations: usize,
    internal_var_names: &[&str],
) -> (Vec<usize>, Vec<usize>) {
    let mut global_var_ids = Vec::with_capacity(
        2 * (inlet_nodes.len() + outlet_nodes.len()) + internal_var_names.len(),
    );
    for n in inlet_nodes {
        global_var_ids.push(n.pres_dof);
        global_var_ids.push(n.flow_dof);
    }
    for n in outlet_nodes {
        global_var_ids.push(n.pres_dof);
        global_var_ids.push(n.flow_dof);
    }
    for name in internal_var_names {
        global_var_ids.push(dofhandler.register_variable(*name));
    }

    let global_eqn_ids = (0..n_equations)
        .map(|_| dofhandler.register_equation())
        .collect();

    (global_var_ids, global_eqn_ids)
}

/// Sign-preserving stenosis resistance `s * |q|`, the nonlinear term shared
/// by `BloodVessel` and `BloodVesselJunction`.
pub fn stenosis_resistance(s: f64, q: f64) -> f64 {
    s * q.abs()
}

#[cfg(test)]
mod tests {
    use super::*;
    use zd_core::NodeId;

    #[test]
    fn setup_dofs_orders_inlet_then_outlet_then_internal() {
        let mut dh = DofHandler::new();
        let inlet = Node::register(NodeId::from_index(0), "A", &mut dh);
        let outlet = Node::register(NodeId::from_index(1), "B", &mut dh);

        let (vars, eqns) = setup_dofs_(&mut dh, &[inlet.clone()], &[outlet.clone()], 3, &["P_c"]);

        assert_eq!(vars, vec![inlet.pres_dof, inlet.flow_dof, outlet.pres_dof, outlet.flow_dof, 4]);
        assert_eq!(eqns, vec![0, 1, 2]);
    }
}
