//! Kernels applied by the traversal once a node's neighborhood is complete.
//!
//! The traversal in [`crate::algs::traversal`] only knows how to gather
//! `(left, center, right)` at a common level and tell interior nodes from
//! boundary nodes. What to compute from that neighborhood is a
//! [`DiffKernel`]; [`DerivativeKernel`] is the stencil derivative.

use crate::algs::communicator::{Priority, World};
use crate::algs::future::Future;
use crate::algs::stencil::DerivativeStencil;
use crate::data::coeffs::{CoeffBlock, Matrix};
use crate::data::tree::{FunctionTree, NodeData};
use crate::mra_error::MraError;
use crate::topology::bc::{BoundaryConds, Side};
use crate::topology::key::TreeKey;
use crate::topology::neighbor::neighbor;

/// Data gathered around one node.
///
/// Each entry may be attached to an ancestor of the box it stands for; an
/// absent neighbor has the invalid key and a zero block.
#[derive(Clone, Debug)]
pub struct Neighborhood<const D: usize> {
    pub key: TreeKey<D>,
    pub left: NodeData<D>,
    pub center: NodeData<D>,
    pub right: NodeData<D>,
}

impl<const D: usize> Neighborhood<D> {
    /// True if either neighbor lies outside the domain.
    pub fn is_boundary(&self) -> bool {
        self.left.key.is_invalid() || self.right.key.is_invalid()
    }
}

/// Continuation of a boundary kernel that needs one more remote value.
pub type Finish<const D: usize> =
    Box<dyn FnOnce(NodeData<D>) -> Result<CoeffBlock, MraError> + Send + 'static>;

/// Result of a kernel application.
pub enum KernelOutput<const D: usize> {
    /// Final output block.
    Ready(CoeffBlock),
    /// Output becomes available once `lookup` resolves and `finish` runs on it.
    Deferred {
        lookup: Future<NodeData<D>>,
        finish: Finish<D>,
    },
}

impl<const D: usize> std::fmt::Debug for KernelOutput<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            KernelOutput::Ready(b) => f.debug_tuple("Ready").field(&b.len()).finish(),
            KernelOutput::Deferred { lookup, .. } => {
                f.debug_tuple("Deferred").field(&lookup.is_ready()).finish()
            }
        }
    }
}

/// Pluggable per-node computation of the traversal.
pub trait DiffKernel<const D: usize>: Send + Sync + 'static {
    /// Output for a node whose two neighbors both exist.
    fn apply_interior(
        &self,
        f: &FunctionTree<D>,
        hood: &Neighborhood<D>,
    ) -> Result<CoeffBlock, MraError>;

    /// Output for a node on the domain edge.
    fn apply_boundary(
        &self,
        world: &World,
        f: &FunctionTree<D>,
        hood: &Neighborhood<D>,
    ) -> Result<KernelOutput<D>, MraError>;
}

/// Stencil derivative along one axis, with optional boundary-value functions.
pub struct DerivativeKernel<const D: usize> {
    axis: usize,
    bc: BoundaryConds<D>,
    stencil: DerivativeStencil,
    g_left: Option<FunctionTree<D>>,
    g_right: Option<FunctionTree<D>>,
    priority: Priority,
}

impl<const D: usize> DerivativeKernel<D> {
    pub fn new(
        axis: usize,
        bc: BoundaryConds<D>,
        stencil: DerivativeStencil,
        g_left: Option<FunctionTree<D>>,
        g_right: Option<FunctionTree<D>>,
        priority: Priority,
    ) -> Self {
        Self {
            axis,
            bc,
            stencil,
            g_left,
            g_right,
            priority,
        }
    }

    pub fn stencil(&self) -> &DerivativeStencil {
        &self.stencil
    }

    /// Boundary-value functions that were supplied, left first.
    pub fn boundary_values(&self) -> impl Iterator<Item = &FunctionTree<D>> {
        self.g_left.iter().chain(self.g_right.iter())
    }

    // m . P(data -> target) along the axis
    fn contract(
        &self,
        f: &FunctionTree<D>,
        m: &Matrix,
        data: &NodeData<D>,
        target: &TreeKey<D>,
    ) -> Result<CoeffBlock, MraError> {
        f.parent_to_child(&data.coeffs, &data.key, target)?
            .transform_axis(m, self.axis)
    }

    fn unit_scale(&self, f: &FunctionTree<D>, key: &TreeKey<D>) -> f64 {
        f.cell().rcell_width(self.axis) * 2f64.powi(key.level() as i32)
    }
}

impl<const D: usize> DiffKernel<D> for DerivativeKernel<D> {
    fn apply_interior(
        &self,
        f: &FunctionTree<D>,
        hood: &Neighborhood<D>,
    ) -> Result<CoeffBlock, MraError> {
        let key = &hood.key;
        let st = &self.stencil;
        let mut d = self.contract(f, &st.rp, &hood.left, &neighbor(key, self.axis, -1, &self.bc)?)?;
        d.axpy(1.0, &self.contract(f, &st.r0, &hood.center, key)?)?;
        d.axpy(
            1.0,
            &self.contract(f, &st.rm, &hood.right, &neighbor(key, self.axis, 1, &self.bc)?)?,
        )?;
        d.scale(self.unit_scale(f, key));
        Ok(d)
    }

    fn apply_boundary(
        &self,
        world: &World,
        f: &FunctionTree<D>,
        hood: &Neighborhood<D>,
    ) -> Result<KernelOutput<D>, MraError> {
        let key = hood.key;
        let axis = self.axis;
        let st = &self.stencil;
        let side = if key.translation()[axis] == 0 {
            Side::Left
        } else {
            Side::Right
        };

        let mut d = match side {
            Side::Left => {
                let mut d = self.contract(
                    f,
                    &st.left_rm,
                    &hood.right,
                    &neighbor(&key, axis, 1, &self.bc)?,
                )?;
                d.axpy(1.0, &self.contract(f, &st.left_r0, &hood.center, &key)?)?;
                d
            }
            Side::Right => {
                let mut d = self.contract(
                    f,
                    &st.right_rp,
                    &hood.left,
                    &neighbor(&key, axis, -1, &self.bc)?,
                )?;
                d.axpy(1.0, &self.contract(f, &st.right_r0, &hood.center, &key)?)?;
                d
            }
        };
        d.scale(self.unit_scale(f, &key));

        let code = self.bc.get(axis, side)?;
        if !code.has_prescribed_value() {
            return Ok(KernelOutput::Ready(d));
        }
        let g = match side {
            Side::Left => self.g_left.as_ref(),
            Side::Right => self.g_right.as_ref(),
        };
        let (Some(source), Some(g)) = (st.source(side == Side::Left), g) else {
            return Ok(KernelOutput::Ready(d));
        };

        let bf = source.to_vec();
        let k = st.k();
        let mut factor = f.cell().rcell_width(axis);
        if code.is_value_type() {
            factor *= 2f64.powi(key.level() as i32);
        }
        let lookup = g.find_coeffs(world, key, self.priority);
        let finish: Finish<D> = Box::new(move |gv: NodeData<D>| {
            let expected = k.pow(D as u32);
            if gv.coeffs.len() != expected {
                return Err(MraError::BlockShape {
                    expected,
                    found: gv.coeffs.len(),
                });
            }
            let rest = gv.coeffs.slice_axis(axis, 0);
            let mut out = CoeffBlock::outer_along_axis(k, D, axis, &bf, &rest);
            out.scale(factor);
            out.axpy(1.0, &d)?;
            Ok(out)
        });
        Ok(KernelOutput::Deferred { lookup, finish })
    }
}
