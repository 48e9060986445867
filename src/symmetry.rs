//! About the space-group detection of a candidate structure.
//!
//! The detection itself is delegated to the external symmetry library; this module only
//! converts a structure into the cell representation the library consumes. The numeric
//! tolerance materially affects the reported group, so it is always threaded in
//! explicitly by the caller.

use crate::common::constants::atomic_number;
use crate::common::error::*;
use crate::structure::Structure;
use ndarray::Array2;
use nalgebra::{Matrix3, Vector3};
use moyo::MoyoDataset;
use moyo::base::{AngleTolerance, Cell, Lattice};
use moyo::data::Setting;





/// Detect the international space-group number of a structure at the given tolerance
///
/// # Parameters
/// ```
/// s: the input structure
/// symprec: the numeric tolerance of the symmetry search (Unit: Angstrom)
/// ```
///
/// # Examples
/// ```no_run
/// use ordnet::{structure::Structure, symmetry::space_group_number};
/// let s: Structure = Structure::read_poscar("reconstructed.vasp");
/// let group: i32 = space_group_number(&s, 0.001);
/// ```
pub fn space_group_number(s: &Structure, symprec: f64) -> i32
{
    let lattice: Lattice = Lattice::new(Matrix3::new(s.lattice[[0,0]], s.lattice[[0,1]], s.lattice[[0,2]],
                                                     s.lattice[[1,0]], s.lattice[[1,1]], s.lattice[[1,2]],
                                                     s.lattice[[2,0]], s.lattice[[2,1]], s.lattice[[2,2]]));

    let frac: Array2<f64> = s.frac_coord();
    let mut positions: Vec< Vector3<f64> > = Vec::with_capacity(s.natom);
    for i in 0..s.natom
    {
        positions.push(Vector3::new(frac[[i,0]], frac[[i,1]], frac[[i,2]]));
    }

    let numbers: Vec<i32> = s.atom_type.iter().map(|symbol| atomic_number(symbol)).collect();

    let cell: Cell = Cell::new(lattice, positions, numbers);
    let dataset: MoyoDataset = MoyoDataset::new(&cell, symprec, AngleTolerance::Default, Setting::Standard).expect(&error_symmetry_detection(symprec));

    dataset.number
}










#[cfg(test)]
mod tests
{
    use super::*;
    use ndarray::{array, Array2};

    fn cubic_perovskite(a: f64) -> Structure
    {
        let lattice: Array2<f64> = array![[a, 0.0, 0.0], [0.0, a, 0.0], [0.0, 0.0, a]];
        let frac: Array2<f64> = array![
            [0.0, 0.0, 0.0],
            [0.5, 0.5, 0.5],
            [0.5, 0.5, 0.0],
            [0.5, 0.0, 0.5],
            [0.0, 0.5, 0.5],
        ];
        let coord: Array2<f64> = frac.dot(&lattice);
        Structure
        {
            natom: 5,
            lattice,
            atom_type: vec![String::from("Ca"), String::from("Ti"), String::from("O"), String::from("O"), String::from("O")],
            coord,
        }
    }

    #[test]
    fn cubic_perovskite_is_detected_as_group_221()
    {
        let s: Structure = cubic_perovskite(3.85);
        assert_eq!(space_group_number(&s, 0.001), 221);
    }

    #[test]
    fn polar_cation_shift_lowers_the_group_to_99()
    {
        let mut s: Structure = cubic_perovskite(3.85);
        // Displace the B-site cation along z, which removes the mirror perpendicular to it
        s.coord[[1,2]] += 0.08;
        assert_eq!(space_group_number(&s, 0.001), 99);
    }
}
