//! About the reconstruction of the candidate distorted structure from the recovered order
//! parameter.

use crate::common::constants::OUTPUT_AXIS_PERMUTATION;
use crate::features;
use crate::graph::PairGraph;
use crate::io::input::{FeaturePara, ReconPara};
use crate::matrix;
use crate::nn::model::DispNet;
use crate::nn::order_parameter::{self, OrderParameter};
use crate::structure::Structure;
use ndarray::Array2;





/// Apply a displacement field to a structure, keeping its lattice and atom types
///
/// # Parameters
/// ```
/// s: the input structure
/// displacement: the Cartesian displacement of each atom (natom*3 Array, Unit: Angstrom)
/// ```
pub fn apply_displacement(s: &Structure, displacement: &Array2<f64>) -> Structure
{
    Structure
    {
        natom: s.natom,
        lattice: s.lattice.clone(),
        atom_type: s.atom_type.clone(),
        coord: &s.coord + displacement,
    }
}





/// Round the order-parameter values to the given number of decimals
///
/// # Parameters
/// ```
/// values: the input order-parameter values (nrow*N_OP Array)
/// digit: the number of decimals kept
/// ```
pub fn round_order_parameter(values: &Array2<f64>, digit: i32) -> Array2<f64>
{
    let factor: f64 = 10.0f64.powi(digit);
    values.mapv(|value| (value * factor).round() / factor)
}





/// Rebuild the candidate distorted structure: compose the features from the (optionally
/// rounded) final order parameter, run one gradient-free forward pass, align the predicted
/// components with the physical axes through the declared permutation, and add them onto
/// the reference coordinates
///
/// # Parameters
/// ```
/// reference: the input high-symmetry reference structure
/// graph: the pair graph of the reference structure
/// net: the trained displacement network
/// order: the trained order parameter
/// feature_para: the feature-layout parameters the order parameter was trained under
/// recon_para: the reconstruction parameters
/// ```
///
/// # Examples
/// ```no_run
/// # use ordnet::{graph::PairGraph, io::input::Para, reconstruct::reconstruct, structure::Structure};
/// # use ordnet::nn::{model::DispNet, order_parameter::{freeze_mask, OrderParameter}};
/// # let para: Para = Para::new();
/// # let reference = Structure::read_poscar("reference.vasp");
/// # let graph = PairGraph::build(&reference, 4.0);
/// # let net = DispNet::new();
/// # let order = OrderParameter::new(2, &freeze_mask(2, &[]), 0.1);
/// let candidate = reconstruct(&reference, &graph, &net, &order, &para.feature_para, &para.recon_para);
/// candidate.write_poscar("reconstructed.vasp", "reconstructed structure");
/// ```
pub fn reconstruct(
    reference: &Structure,
    graph: &PairGraph,
    net: &DispNet,
    order: &OrderParameter,
    feature_para: &FeaturePara,
    recon_para: &ReconPara,
) -> Structure
{
    // Read out the final order parameter, clamp the frozen components, and round if wanted
    let freeze: Array2<f64> = order_parameter::freeze_mask(feature_para.nrow, &feature_para.frozen_component);
    let mut values: Array2<f64> = order.values_host() * &freeze;
    match recon_para.round_digit
    {
        Some(digit) => values = round_order_parameter(&values, digit),
        None => (),
    }

    // Compose the final features and predict the displacements once, without gradients
    let onehot: Array2<f64> = features::atom_type_onehot(&reference.atom_type, &feature_para.species);
    let site_weight: Array2<f64> = features::site_weight(feature_para, reference);
    let feature: Array2<f64> = features::compose(&onehot, &site_weight, &values);
    let predicted: Array2<f64> = net.predict(&feature, graph);

    // Align the predicted components with the physical axes and displace the reference
    let permutation: Array2<f64> = matrix::permutation_matrix(&OUTPUT_AXIS_PERMUTATION);
    let displacement: Array2<f64> = predicted.dot(&permutation);

    apply_displacement(reference, &displacement)
}










#[cfg(test)]
mod tests
{
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn zero_displacement_reproduces_the_reference_exactly()
    {
        let reference = Structure
        {
            natom: 2,
            lattice: array![[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]],
            atom_type: vec![String::from("Ti"), String::from("O")],
            coord: array![[0.0, 0.0, 0.0], [2.0, 2.0, 2.0]],
        };
        let candidate: Structure = apply_displacement(&reference, &Array2::zeros((2, 3)));
        for i in 0..2
        {
            for j in 0..3
            {
                assert_eq!(candidate.coord[[i,j]], reference.coord[[i,j]]);
            }
        }
    }

    #[test]
    fn rounding_keeps_the_requested_decimals()
    {
        let values: Array2<f64> = array![[0.248, -0.0049, 1.051]];
        let rounded: Array2<f64> = round_order_parameter(&values, 2);
        assert_abs_diff_eq!(rounded[[0,0]], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(rounded[[0,1]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(rounded[[0,2]], 1.05, epsilon = 1e-12);
    }
}
