//! About the alignment of two corresponding structures under periodic boundary conditions.

use crate::common::error::*;
use crate::structure::Structure;
use ndarray::Array2;





/// Compute the minimum-image displacement field from a reference structure to a distorted
/// structure sharing its lattice and atom ordering. For each reference atom, the nearest
/// periodic image over all distorted-structure atoms is searched within a fixed radius;
/// exact distance ties keep the lowest distorted site index. The assignment is validated
/// to be one-to-one, since a doubly-claimed site would silently corrupt the target data.
///
/// # Parameters
/// ```
/// reference: the input high-symmetry reference structure
/// distorted: the input distorted structure, in one-to-one correspondence with the reference
/// search_radius: the radius of the nearest-image search around each reference atom (Unit: Angstrom)
/// ```
///
/// # Examples
/// ```no_run
/// use ordnet::structure::{Structure, align::displacement_field};
/// let reference: Structure = Structure::read_poscar("reference.vasp");
/// let distorted: Structure = Structure::read_poscar("distorted.vasp");
/// let displacement = displacement_field(&reference, &distorted, 1.0);
/// ```
pub fn displacement_field(reference: &Structure, distorted: &Structure, search_radius: f64) -> Array2<f64>
{
    if reference.natom != distorted.natom
    {
        panic!("{}", error_atom_count(reference.natom, distorted.natom));
    }
    let natom: usize = reference.natom;
    let radius_powi2: f64 = search_radius.powi(2);

    // Extend the distorted structure to its 3*3*3 periodic images
    let lattice: &Array2<f64> = &reference.lattice;
    let mut image_coord: Array2<f64> = Array2::zeros((natom*27, 3));
    let mut n: usize = 0;
    for i in [0, -1, 1]
    {
        for j in [0, -1, 1]
        {
            for k in [0, -1, 1]
            {
                for l in 0..natom
                {
                    image_coord[[n,0]] = distorted.coord[[l,0]] + lattice[[0,0]] * (i as f64) + lattice[[1,0]] * (j as f64) + lattice[[2,0]] * (k as f64);
                    image_coord[[n,1]] = distorted.coord[[l,1]] + lattice[[0,1]] * (i as f64) + lattice[[1,1]] * (j as f64) + lattice[[2,1]] * (k as f64);
                    image_coord[[n,2]] = distorted.coord[[l,2]] + lattice[[0,2]] * (i as f64) + lattice[[1,2]] * (j as f64) + lattice[[2,2]] * (k as f64);
                    n += 1;
                }
            }
        }
    }

    // For each reference atom, achieve the nearest distorted-structure image within the radius
    let mut displacement: Array2<f64> = Array2::zeros((natom, 3));
    let mut claimed_by: Vec<Option<usize>> = vec![None; natom];
    for i in 0..natom
    {
        let mut best_site: Option<usize> = None;
        let mut best_dist_powi2: f64 = radius_powi2;
        let mut best_vector: [f64; 3] = [0.0; 3];
        for m in 0..image_coord.nrows()
        {
            let dx: f64 = image_coord[[m,0]] - reference.coord[[i,0]];
            let dy: f64 = image_coord[[m,1]] - reference.coord[[i,1]];
            let dz: f64 = image_coord[[m,2]] - reference.coord[[i,2]];
            let dist_powi2: f64 = dx.powi(2) + dy.powi(2) + dz.powi(2);
            // The strict comparison keeps the earliest candidate on an exact tie, and the
            // image loop enumerates the distorted sites in ascending order within each shift
            if dist_powi2 < best_dist_powi2
            {
                best_site = Some(m % natom);
                best_dist_powi2 = dist_powi2;
                best_vector = [dx, dy, dz];
            }
        }

        match best_site
        {
            Some(site) =>
            {
                match claimed_by[site]
                {
                    Some(owner) => panic!("{}", error_injective(owner, i, site)),
                    None => claimed_by[site] = Some(i),
                }
                displacement[[i,0]] = best_vector[0];
                displacement[[i,1]] = best_vector[1];
                displacement[[i,2]] = best_vector[2];
            },
            None => panic!("{}", error_no_image(i, search_radius)),
        }
    }

    displacement
}










#[cfg(test)]
mod tests
{
    use super::*;
    use ndarray::{array, Array2};

    fn cubic_pair(reference_coord: Array2<f64>, distorted_coord: Array2<f64>) -> (Structure, Structure)
    {
        let lattice: Array2<f64> = array![[4.0, 0.0, 0.0], [0.0, 4.0, 0.0], [0.0, 0.0, 4.0]];
        let natom: usize = reference_coord.nrows();
        let atom_type: Vec<String> = vec![String::from("O"); natom];
        let reference = Structure { natom, lattice: lattice.clone(), atom_type: atom_type.clone(), coord: reference_coord };
        let distorted = Structure { natom, lattice, atom_type, coord: distorted_coord };
        (reference, distorted)
    }

    #[test]
    fn wraps_across_the_periodic_boundary()
    {
        let (reference, distorted) = cubic_pair(
            array![[3.9, 0.0, 0.0], [2.0, 2.0, 2.0]],
            array![[0.05, 0.0, 0.0], [2.0, 2.0, 2.1]],
        );
        let displacement: Array2<f64> = displacement_field(&reference, &distorted, 1.0);
        // The image at 4.05 is nearer than the in-cell site at 0.05
        assert!((displacement[[0,0]] - 0.15).abs() < 1e-12);
        assert!((displacement[[1,2]] - 0.1).abs() < 1e-12);
    }

    #[test]
    fn magnitudes_stay_below_the_search_radius()
    {
        let (reference, distorted) = cubic_pair(
            array![[0.0, 0.0, 0.0], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]],
            array![[0.2, 0.1, 3.9], [2.3, 0.0, 0.0], [0.0, 1.6, 0.0]],
        );
        let search_radius: f64 = 1.0;
        let displacement: Array2<f64> = displacement_field(&reference, &distorted, search_radius);
        for i in 0..reference.natom
        {
            let magnitude: f64 = (displacement[[i,0]].powi(2) + displacement[[i,1]].powi(2) + displacement[[i,2]].powi(2)).sqrt();
            assert!(magnitude < search_radius);
        }
    }

    #[test]
    #[should_panic]
    fn fails_when_no_image_lies_within_the_radius()
    {
        let (reference, distorted) = cubic_pair(
            array![[0.0, 0.0, 0.0]],
            array![[2.0, 2.0, 2.0]],
        );
        displacement_field(&reference, &distorted, 1.0);
    }

    #[test]
    #[should_panic]
    fn fails_when_two_atoms_claim_the_same_site()
    {
        let (reference, distorted) = cubic_pair(
            array![[0.0, 0.0, 0.0], [0.5, 0.0, 0.0]],
            array![[0.25, 0.0, 0.0], [2.0, 2.0, 2.0]],
        );
        displacement_field(&reference, &distorted, 1.0);
    }
}
