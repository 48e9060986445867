//! About the per-atom input features: a fixed one-hot atom-type block concatenated with
//! the site-weighted order-parameter block.

use crate::common::constants::{Device, N_FEAT, N_OP, N_TYPE, TWO_PI};
use crate::common::error::*;
use crate::io::input::FeaturePara;
use crate::structure::Structure;
use ndarray::Array2;
use dfdx::shapes::{Axes2, Const};
use dfdx::tensor::{Merge, NoneTape, Tape, Tensor, TensorFromVec};
use dfdx::tensor_ops::{PermuteTo, TryMatMul};





/// Encode the atom types of a structure as one-hot rows over a declared species ordering
///
/// # Parameters
/// ```
/// atom_type: the element symbols of the atoms (natom Vec)
/// species: the declared species ordering of the one-hot block (N_TYPE Vec)
/// ```
pub fn atom_type_onehot(atom_type: &[String], species: &[String]) -> Array2<f64>
{
    let natom: usize = atom_type.len();
    let mut onehot: Array2<f64> = Array2::zeros((natom, N_TYPE));
    for i in 0..natom
    {
        let mut index: Option<usize> = None;
        for t in 0..species.len()
        {
            if atom_type[i] == species[t]
            {
                index = Some(t);
                break
            }
        }
        match index
        {
            Some(t) => onehot[[i,t]] = 1.0,
            None => panic!("{}", error_species(&atom_type[i])),
        }
    }

    onehot
}





/// Assemble the site-weight matrix of the direct variant: each special site carries one row
/// of the order-parameter tensor, and symmetry-related sites may share a row
///
/// # Parameters
/// ```
/// natom: the number of atoms of the structure
/// special_site: the atom indices carrying an order-parameter contribution
/// site_row: for each special site, the order-parameter row assigned to it
/// nrow: the number of rows of the order-parameter tensor
/// ```
pub fn site_weight_direct(natom: usize, special_site: &[usize], site_row: &[usize], nrow: usize) -> Array2<f64>
{
    let mut weight: Array2<f64> = Array2::zeros((natom, nrow));
    for s in 0..special_site.len()
    {
        if site_row[s] >= nrow
        {
            panic!("{}", error_order_layout(site_row[s] + 1, nrow));
        }
        weight[[special_site[s], site_row[s]]] = 1.0;
    }

    weight
}





/// Assemble the site-weight matrix of the k-vector variant: a discrete Fourier synthesis
/// restricted to a finite set of high-symmetry periodicity vectors, where the weight of
/// k-vector k at a special site with fractional coordinate x is cos(2*pi * k.x).
/// Non-special atoms receive an all-zero row.
///
/// # Parameters
/// ```
/// natom: the number of atoms of the structure
/// special_site: the atom indices carrying an order-parameter contribution
/// kvector: the fixed periodicity vectors, in fractional reciprocal coordinates (nkvec Vec)
/// frac: the fractional coordinates of all the atoms (natom*3 Array)
/// ```
pub fn site_weight_kvector(natom: usize, special_site: &[usize], kvector: &[[f64; 3]], frac: &Array2<f64>) -> Array2<f64>
{
    let nkvec: usize = kvector.len();
    let mut weight: Array2<f64> = Array2::zeros((natom, nkvec));
    for s in 0..special_site.len()
    {
        let i: usize = special_site[s];
        for k in 0..nkvec
        {
            let phase: f64 = kvector[k][0] * frac[[i,0]] + kvector[k][1] * frac[[i,1]] + kvector[k][2] * frac[[i,2]];
            weight[[i,k]] = (TWO_PI * phase).cos();
        }
    }

    weight
}





/// Assemble the site-weight matrix declared by the feature parameters: the k-vector
/// cosine modulation when periodicity vectors are given, the direct site assignment
/// otherwise
///
/// # Parameters
/// ```
/// feature_para: the input feature-layout parameters
/// s: the input structure the weights are evaluated on
/// ```
pub fn site_weight(feature_para: &FeaturePara, s: &Structure) -> Array2<f64>
{
    match &feature_para.kvector
    {
        // The k-vector variant: one row per periodicity vector
        Some(kvector) =>
        {
            if kvector.len() != feature_para.nrow
            {
                panic!("{}", error_order_layout(feature_para.nrow, kvector.len()));
            }
            site_weight_kvector(s.natom, &feature_para.special_site, kvector, &s.frac_coord())
        },

        // The direct variant: one row per special site, possibly shared
        None =>
        {
            if feature_para.site_row.len() != feature_para.special_site.len()
            {
                panic!("{}", error_order_layout(feature_para.site_row.len(), feature_para.special_site.len()));
            }
            site_weight_direct(s.natom, &feature_para.special_site, &feature_para.site_row, feature_para.nrow)
        },
    }
}





/// Compose the full per-atom feature matrix from the one-hot block and the site-weighted
/// order-parameter block. The output shape is (natom, N_FEAT) independently of the
/// magnitude of the order-parameter values.
///
/// # Parameters
/// ```
/// onehot: the one-hot atom-type block (natom*N_TYPE Array)
/// weight: the site-weight matrix (natom*nrow Array)
/// order_parameter: the current order-parameter values (nrow*N_OP Array)
/// ```
pub fn compose(onehot: &Array2<f64>, weight: &Array2<f64>, order_parameter: &Array2<f64>) -> Array2<f64>
{
    if weight.ncols() != order_parameter.nrows()
    {
        panic!("{}", error_order_layout(order_parameter.nrows(), weight.ncols()));
    }

    let natom: usize = onehot.nrows();
    let block: Array2<f64> = weight.dot(order_parameter);
    let mut feature: Array2<f64> = Array2::zeros((natom, N_FEAT));
    for i in 0..natom
    {
        for t in 0..N_TYPE
        {
            feature[[i,t]] = onehot[[i,t]];
        }
        for c in 0..N_OP
        {
            feature[[i, N_TYPE + c]] = block[[i,c]];
        }
    }

    feature
}





/// Upload the one-hot block as the transposed, zero-padded constant tensor consumed by
/// 'compose_on_tape'
pub fn onehot_padded_tensor(onehot: &Array2<f64>, dev: &Device) -> Tensor<(Const<N_FEAT>, usize), f64, Device>
{
    let natom: usize = onehot.nrows();
    let mut padded: Vec<f64> = vec![0.0; N_FEAT * natom];
    for i in 0..natom
    {
        for t in 0..N_TYPE
        {
            padded[t * natom + i] = onehot[[i,t]];
        }
    }

    dev.tensor_from_vec(padded, (Const::<N_FEAT>, natom))
}

/// Upload the site-weight matrix as the transposed constant tensor consumed by
/// 'compose_on_tape'
pub fn site_weight_tensor(weight: &Array2<f64>, dev: &Device) -> Tensor<(usize, usize), f64, Device>
{
    let natom: usize = weight.nrows();
    let nrow: usize = weight.ncols();
    let mut transposed: Vec<f64> = vec![0.0; nrow * natom];
    for i in 0..natom
    {
        for r in 0..nrow
        {
            transposed[r * natom + i] = weight[[i,r]];
        }
    }

    dev.tensor_from_vec(transposed, (nrow, natom))
}

/// The constant selector that embeds the order-parameter components into the tail of the
/// feature vector
pub fn component_selector(dev: &Device) -> Tensor<(Const<N_OP>, Const<N_FEAT>), f64, Device>
{
    let mut selector: Vec<f64> = vec![0.0; N_OP * N_FEAT];
    for c in 0..N_OP
    {
        selector[c * N_FEAT + N_TYPE + c] = 1.0;
    }

    dev.tensor_from_vec(selector, (Const::<N_OP>, Const::<N_FEAT>))
}





/// Compose the full per-atom feature tensor on the current gradient tape, so that the
/// reconstruction loss can be differentiated through the order-parameter values. The
/// frozen components are zeroed by the mask before entering the features. Numerically
/// this matches 'compose' on the same inputs.
///
/// # Parameters
/// ```
/// order_parameter: the order-parameter tensor, traced when its gradients are wanted (nrow*N_OP)
/// freeze_mask: the 0/1 mask zeroing the frozen components (nrow*N_OP)
/// selector: the component selector from 'component_selector'
/// site_weight_t: the transposed site-weight tensor from 'site_weight_tensor' (nrow*natom)
/// onehot_padded_t: the transposed padded one-hot tensor from 'onehot_padded_tensor' (N_FEAT*natom)
/// ```
pub fn compose_on_tape<T: Tape<f64, Device> + Merge<NoneTape>>(
    order_parameter: Tensor<(usize, Const<N_OP>), f64, Device, T>,
    freeze_mask: &Tensor<(usize, Const<N_OP>), f64, Device>,
    selector: &Tensor<(Const<N_OP>, Const<N_FEAT>), f64, Device>,
    site_weight_t: &Tensor<(usize, usize), f64, Device>,
    onehot_padded_t: &Tensor<(Const<N_FEAT>, usize), f64, Device>,
) -> Tensor<(usize, Const<N_FEAT>), f64, Device, T>
{
    let masked = order_parameter * freeze_mask.clone();
    let block = masked.matmul(selector.clone());                                        // (nrow, N_FEAT)
    let feature_t = block.permute::<_, Axes2<1, 0>>().matmul(site_weight_t.clone())     // (N_FEAT, natom)
                    + onehot_padded_t.clone();

    feature_t.permute::<_, Axes2<1, 0>>()
}










#[cfg(test)]
mod tests
{
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    fn species() -> Vec<String>
    {
        vec![String::from("Ca"), String::from("Ti"), String::from("O")]
    }

    #[test]
    fn onehot_follows_the_declared_ordering()
    {
        let atom_type: Vec<String> = vec![String::from("O"), String::from("Ca")];
        let onehot: Array2<f64> = atom_type_onehot(&atom_type, &species());
        assert_eq!(onehot, array![[0.0, 0.0, 1.0], [1.0, 0.0, 0.0]]);
    }

    #[test]
    #[should_panic]
    fn onehot_fails_on_an_undeclared_species()
    {
        let atom_type: Vec<String> = vec![String::from("Xe")];
        atom_type_onehot(&atom_type, &species());
    }

    #[test]
    fn kvector_weights_are_cosines_of_the_projected_phase()
    {
        let frac: Array2<f64> = array![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0], [0.25, 0.25, 0.0]];
        let kvector: Vec<[f64; 3]> = vec![[0.5, 0.5, 0.5], [0.5, 0.5, 0.0]];
        let weight: Array2<f64> = site_weight_kvector(3, &[0, 1], &kvector, &frac);
        // cos(0) at the origin for both periodicity vectors
        assert_abs_diff_eq!(weight[[0,0]], 1.0, epsilon = 1e-12);
        assert_abs_diff_eq!(weight[[0,1]], 1.0, epsilon = 1e-12);
        // k.x = 0.25 gives cos(pi/2) = 0
        assert_abs_diff_eq!(weight[[1,0]], 0.0, epsilon = 1e-12);
        // The non-special atom carries an all-zero row
        assert_abs_diff_eq!(weight[[2,0]], 0.0, epsilon = 1e-12);
        assert_abs_diff_eq!(weight[[2,1]], 0.0, epsilon = 1e-12);
    }

    #[test]
    fn direct_weights_may_share_a_row()
    {
        let weight: Array2<f64> = site_weight_direct(4, &[1, 3], &[0, 0], 1);
        assert_eq!(weight, array![[0.0], [1.0], [0.0], [1.0]]);
    }

    #[test]
    fn composition_is_shape_preserving()
    {
        let atom_type: Vec<String> = vec![String::from("Ca"), String::from("Ti"), String::from("O"), String::from("O")];
        let onehot: Array2<f64> = atom_type_onehot(&atom_type, &species());
        let weight: Array2<f64> = site_weight_direct(4, &[2, 3], &[0, 1], 2);
        let small: Array2<f64> = array![[0.01, 0.0, 0.02], [0.0, 0.01, 0.0]];
        let large: Array2<f64> = &small * 1000.0;
        assert_eq!(compose(&onehot, &weight, &small).dim(), (4, N_FEAT));
        assert_eq!(compose(&onehot, &weight, &large).dim(), (4, N_FEAT));
    }

    #[test]
    fn zero_order_parameter_leaves_only_the_onehot_block()
    {
        let atom_type: Vec<String> = vec![String::from("Ti"), String::from("O")];
        let onehot: Array2<f64> = atom_type_onehot(&atom_type, &species());
        let weight: Array2<f64> = site_weight_direct(2, &[1], &[0], 1);
        let feature: Array2<f64> = compose(&onehot, &weight, &Array2::zeros((1, N_OP)));
        for i in 0..2
        {
            for t in 0..N_TYPE
            {
                assert_abs_diff_eq!(feature[[i,t]], onehot[[i,t]], epsilon = 1e-12);
            }
            for c in 0..N_OP
            {
                assert_abs_diff_eq!(feature[[i, N_TYPE + c]], 0.0, epsilon = 1e-12);
            }
        }
    }

    #[test]
    #[should_panic]
    fn composition_fails_on_a_mismatched_layout()
    {
        let atom_type: Vec<String> = vec![String::from("Ti")];
        let onehot: Array2<f64> = atom_type_onehot(&atom_type, &species());
        let weight: Array2<f64> = site_weight_direct(1, &[0], &[0], 1);
        compose(&onehot, &weight, &Array2::zeros((2, N_OP)));
    }

    #[test]
    fn on_tape_composition_matches_the_host_composition()
    {
        let dev: Device = Default::default();
        let atom_type: Vec<String> = vec![String::from("Ca"), String::from("O"), String::from("O")];
        let onehot: Array2<f64> = atom_type_onehot(&atom_type, &species());
        let weight: Array2<f64> = site_weight_direct(3, &[1, 2], &[0, 1], 2);
        let order_parameter: Array2<f64> = array![[0.3, -0.1, 0.0], [0.0, 0.2, 0.5]];

        let host: Array2<f64> = compose(&onehot, &weight, &order_parameter);

        let op_t = dev.tensor_from_vec(order_parameter.iter().cloned().collect::<Vec<f64>>(), (2, Const::<N_OP>));
        let mask_t = dev.tensor_from_vec(vec![1.0; 2 * N_OP], (2, Const::<N_OP>));
        let device: Tensor<(usize, Const<N_FEAT>), f64, Device> = compose_on_tape(
            op_t,
            &mask_t,
            &component_selector(&dev),
            &site_weight_tensor(&weight, &dev),
            &onehot_padded_tensor(&onehot, &dev),
        );
        let device_flat: Vec<f64> = device.as_vec();

        for i in 0..3
        {
            for f in 0..N_FEAT
            {
                assert_abs_diff_eq!(device_flat[i * N_FEAT + f], host[[i,f]], epsilon = 1e-12);
            }
        }
    }
}
