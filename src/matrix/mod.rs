//! About the small matrix operations on the lattice and the axis conventions.

use crate::common::error::*;
use ndarray::Array2;
use nalgebra::Matrix3;





/// Invert a 3*3 lattice matrix
///
/// # Parameters
/// ```
/// lattice: the input 3*3 lattice matrix (rows are the lattice vectors, Unit: Angstrom)
/// ```
pub fn inverse_3x3(lattice: &Array2<f64>) -> Array2<f64>
{
    let m: Matrix3<f64> = Matrix3::new(lattice[[0,0]], lattice[[0,1]], lattice[[0,2]],
                                       lattice[[1,0]], lattice[[1,1]], lattice[[1,2]],
                                       lattice[[2,0]], lattice[[2,1]], lattice[[2,2]]);
    let inv: Matrix3<f64> = match m.try_inverse()
    {
        Some(inv) => inv,
        None => panic!("{}", error_singular_lattice()),
    };

    let mut inverse: Array2<f64> = Array2::zeros((3, 3));
    for i in 0..3
    {
        for j in 0..3
        {
            inverse[[i,j]] = inv[(i,j)];
        }
    }

    inverse
}





/// Transform Cartesian coordinates to fractional coordinates with respect to the lattice
///
/// # Parameters
/// ```
/// lattice: the input 3*3 lattice matrix (rows are the lattice vectors, Unit: Angstrom)
/// coord: the input Cartesian coordinates (natom*3 Array, Unit: Angstrom)
/// ```
pub fn cart_to_frac(lattice: &Array2<f64>, coord: &Array2<f64>) -> Array2<f64>
{
    // With row coordinate vectors, r = f * L, hence f = r * L^-1
    let inverse: Array2<f64> = inverse_3x3(lattice);
    coord.dot(&inverse)
}

/// Transform fractional coordinates to Cartesian coordinates with respect to the lattice
///
/// # Parameters
/// ```
/// lattice: the input 3*3 lattice matrix (rows are the lattice vectors, Unit: Angstrom)
/// frac: the input fractional coordinates (natom*3 Array)
/// ```
pub fn frac_to_cart(lattice: &Array2<f64>, frac: &Array2<f64>) -> Array2<f64>
{
    frac.dot(lattice)
}





/// Build the 3*3 matrix that reorders the network output components onto the physical axes,
/// so that multiplying a row of network components by it from the right yields (x, y, z)
///
/// # Parameters
/// ```
/// permutation: for physical axis k, the index of the network component that carries it
/// ```
pub fn permutation_matrix(permutation: &[usize; 3]) -> Array2<f64>
{
    let mut p: Array2<f64> = Array2::zeros((3, 3));
    for k in 0..3
    {
        p[[permutation[k], k]] = 1.0;
    }

    p
}










#[cfg(test)]
mod tests
{
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    #[test]
    fn inverse_of_triclinic_lattice()
    {
        let lattice: Array2<f64> = array![[4.0, 0.0, 0.0], [0.3, 3.8, 0.0], [0.1, 0.4, 5.2]];
        let product: Array2<f64> = lattice.dot(&inverse_3x3(&lattice));
        for i in 0..3
        {
            for j in 0..3
            {
                let expected: f64 = if i == j { 1.0 } else { 0.0 };
                assert_abs_diff_eq!(product[[i,j]], expected, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn fractional_round_trip()
    {
        let lattice: Array2<f64> = array![[5.4, 0.0, 0.0], [0.0, 5.5, 0.0], [0.2, 0.0, 7.7]];
        let coord: Array2<f64> = array![[1.0, 2.0, 3.0], [4.1, 0.4, 6.9]];
        let back: Array2<f64> = frac_to_cart(&lattice, &cart_to_frac(&lattice, &coord));
        for i in 0..coord.nrows()
        {
            for j in 0..3
            {
                assert_abs_diff_eq!(back[[i,j]], coord[[i,j]], epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn permutation_matrix_reorders_components()
    {
        // The network ordering (y, z, x) carries physical x in component 2
        let p: Array2<f64> = permutation_matrix(&[2, 0, 1]);
        let network_row: Array2<f64> = array![[10.0, 20.0, 30.0]];
        let physical: Array2<f64> = network_row.dot(&p);
        assert_abs_diff_eq!(physical[[0,0]], 30.0, epsilon = 1e-12);
        assert_abs_diff_eq!(physical[[0,1]], 10.0, epsilon = 1e-12);
        assert_abs_diff_eq!(physical[[0,2]], 20.0, epsilon = 1e-12);
    }
}
