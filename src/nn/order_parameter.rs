//! The learnable order-parameter tensor, its symmetry constraints, and its sparsity
//! regularization.

use crate::common::constants::{Device, N_OP};
use crate::common::error::*;
use std::fs;
use ndarray::Array2;
use ndarray_rand::RandomExt;
use ndarray_rand::rand_distr::Uniform;
use dfdx::dtypes::Dtype;
use dfdx::nn::tensor_collection::{ModuleVisitor, TensorCollection, TensorOptions};
use dfdx::nn::{LoadFromSafetensors, SaveToSafetensors};
use dfdx::shapes::{Const, HasShape};
use dfdx::tensor::{Storage, Tensor, TensorFromVec};
use dfdx::tensor_ops::Device as DfdxDevice;





/// The learnable order parameter: one row per special site (direct variant) or per
/// periodicity vector (k-vector variant), with N_OP components each. This is the primary
/// learned artifact of the pipeline; it is stepped by its own optimizer as a parameter
/// group separate from the network weights.
///
/// # Fields
/// ```
/// values: the order-parameter values (nrow*N_OP Tensor)
/// ```
#[derive(Clone, Debug)]
pub struct OrderParameter<E: Dtype = f64, D: Storage<E> = Device>
{
    pub values: Tensor<(usize, Const<N_OP>), E, D>,
}





impl<E: Dtype, D: DfdxDevice<E>> TensorCollection<E, D> for OrderParameter<E, D>
{
    type To<E2: Dtype, D2: DfdxDevice<E2>> = OrderParameter<E2, D2>;

    fn iter_tensors<V: ModuleVisitor<Self, E, D>>(visitor: &mut V) -> Result<Option<Self::To<V::E2, V::D2>>, V::Err>
    {
        visitor.visit_fields(
            Self::tensor("values", |s| &s.values, |s| &mut s.values, TensorOptions::reset_to_zeros()),
            |values| OrderParameter { values },
        )
    }
}





impl OrderParameter
{
    /// Construct a new order parameter with small random values on the free components and
    /// exact zeros on the frozen ones
    ///
    /// # Parameters
    /// ```
    /// nrow: the number of rows of the order-parameter tensor
    /// freeze_mask: the 0/1 mask zeroing the frozen components (nrow*N_OP Array)
    /// init_scale: the half-width of the uniform random initialization
    /// ```
    ///
    /// # Examples
    /// ```
    /// use ordnet::nn::order_parameter::{freeze_mask, OrderParameter};
    /// let mask = freeze_mask(2, &[2]);
    /// let order: OrderParameter = OrderParameter::new(2, &mask, 0.1);
    /// ```
    pub fn new(nrow: usize, freeze_mask: &Array2<f64>, init_scale: f64) -> Self
    {
        let dev: Device = Device::seed_from_u64(1314);

        let init: Array2<f64> = match init_scale > 0.0
        {
            true => Array2::random((nrow, N_OP), Uniform::new(-init_scale, init_scale)) * freeze_mask,
            false => Array2::zeros((nrow, N_OP)),
        };
        let values: Tensor<(usize, Const<N_OP>), f64, Device> = dev.tensor_from_vec(init.iter().cloned().collect(), (nrow, Const::<N_OP>));

        OrderParameter
        {
            values,
        }
    }



    /// Copy the current order-parameter values back to the host
    pub fn values_host(&self) -> Array2<f64>
    {
        let (nrow, _) = *self.values.shape();
        Array2::from_shape_vec((nrow, N_OP), self.values.as_vec()).expect(&error_none_value("values"))
    }



    /// Save the order parameter into the sub-directory (the path with respect to directory
    /// 'nn') in the safetensors format
    pub fn save(&self, sub_dir: &str)
    {
        let dir: String = format!("nn/{sub_dir}");
        let dir_exist = fs::metadata(&dir);
        match dir_exist
        {
            Ok(_) => (),
            Err(_) => fs::create_dir_all(&dir).expect(&error_dir("creating", &dir)),
        }

        self.save_safetensors(format!("{dir}/Order_Parameter.safetensors")).expect(&error_file("creating", &format!("{dir}/Order_Parameter.safetensors")));
    }

    /// Load the order parameter from the sub-directory (the path with respect to directory
    /// 'nn'), keeping the declared layout
    pub fn load(sub_dir: &str, nrow: usize, freeze_mask: &Array2<f64>) -> Self
    {
        let mut order: OrderParameter = OrderParameter::new(nrow, freeze_mask, 0.0);
        let dir: String = format!("nn/{sub_dir}");
        order.load_safetensors(format!("{dir}/Order_Parameter.safetensors")).expect(&error_file("reading", &format!("{dir}/Order_Parameter.safetensors")));

        order
    }
}





/// Build the 0/1 mask that zeroes the frozen order-parameter components, encoding the
/// symmetry constraints known a priori
///
/// # Parameters
/// ```
/// nrow: the number of rows of the order-parameter tensor
/// frozen_component: the component indices clamped to zero on every row
/// ```
pub fn freeze_mask(nrow: usize, frozen_component: &[usize]) -> Array2<f64>
{
    let mut mask: Array2<f64> = Array2::ones((nrow, N_OP));
    for c in frozen_component
    {
        for r in 0..nrow
        {
            mask[[r, *c]] = 0.0;
        }
    }

    mask
}





/// Build the power-law weights of the sparsity regularization: component c is weighted by
/// its symmetry order to the given power, so the higher-order contributions are penalized
/// at least as strongly as the lower-order ones at equal magnitude
///
/// # Parameters
/// ```
/// nrow: the number of rows of the order-parameter tensor
/// order_l: the symmetry order of each component (N_OP array)
/// power: the exponent of the power-law weighting
/// ```
pub fn regularization_weight_matrix(nrow: usize, order_l: &[f64; N_OP], power: i32) -> Array2<f64>
{
    let mut weight: Array2<f64> = Array2::zeros((nrow, N_OP));
    for r in 0..nrow
    {
        for c in 0..N_OP
        {
            weight[[r,c]] = order_l[c].powi(power);
        }
    }

    weight
}

/// The sparsity penalty of the order parameter: the L1 magnitude of its values, weighted
/// by the power-law weights of 'regularization_weight_matrix'
///
/// # Parameters
/// ```
/// values: the current order-parameter values (nrow*N_OP Array)
/// order_l: the symmetry order of each component (N_OP array)
/// power: the exponent of the power-law weighting
/// ```
pub fn sparsity_penalty(values: &Array2<f64>, order_l: &[f64; N_OP], power: i32) -> f64
{
    let weight: Array2<f64> = regularization_weight_matrix(values.nrows(), order_l, power);
    let mut penalty: f64 = 0.0;
    for r in 0..values.nrows()
    {
        for c in 0..N_OP
        {
            penalty += values[[r,c]].abs() * weight[[r,c]];
        }
    }

    penalty
}










#[cfg(test)]
mod tests
{
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn frozen_components_start_at_exact_zero()
    {
        let mask: Array2<f64> = freeze_mask(2, &[1]);
        let order: OrderParameter = OrderParameter::new(2, &mask, 0.1);
        let values: Array2<f64> = order.values_host();
        for r in 0..2
        {
            assert_eq!(values[[r,1]], 0.0);
            assert!(values[[r,0]].abs() <= 0.1);
            assert!(values[[r,2]].abs() <= 0.1);
        }
    }

    #[test]
    fn penalty_scales_monotonically_with_the_magnitude()
    {
        let order_l: [f64; N_OP] = [1.0, 2.0, 3.0];
        let small: Array2<f64> = array![[0.1, -0.2, 0.05]];
        let large: Array2<f64> = &small * 3.0;
        let penalty_small: f64 = sparsity_penalty(&small, &order_l, 6);
        let penalty_large: f64 = sparsity_penalty(&large, &order_l, 6);
        assert!(penalty_large > penalty_small);
        assert_abs_diff_eq!(penalty_large, 3.0 * penalty_small, epsilon = 1e-12);
    }

    #[test]
    fn higher_order_components_are_penalized_at_least_as_strongly()
    {
        let order_l: [f64; N_OP] = [1.0, 2.0, 3.0];
        let low: Array2<f64> = array![[0.5, 0.0, 0.0]];
        let middle: Array2<f64> = array![[0.0, 0.5, 0.0]];
        let high: Array2<f64> = array![[0.0, 0.0, 0.5]];
        let penalty_low: f64 = sparsity_penalty(&low, &order_l, 6);
        let penalty_middle: f64 = sparsity_penalty(&middle, &order_l, 6);
        let penalty_high: f64 = sparsity_penalty(&high, &order_l, 6);
        assert!(penalty_middle >= penalty_low);
        assert!(penalty_high >= penalty_middle);
    }
}
