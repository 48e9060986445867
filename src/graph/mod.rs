//! About the periodic neighbor graph consumed by the message passing.

use crate::common::constants::N_EDGE;
use crate::common::error::*;
use crate::structure::Structure;
use ndarray::{Array1, Array2};





/// The pair graph of a periodic structure: one directed edge per (center, neighbor image)
/// pair within the cutoff radius, with the relative vector and distance as edge attributes.
///
/// # Fields
/// ```
/// nedge: the number of directed edges
/// edge_src: the source (neighbor) atom of each edge (nedge Vec)
/// edge_dst: the destination (center) atom of each edge (nedge Vec)
/// edge_vec: the Cartesian vector from the center to the neighbor image (nedge*3 Array, Unit: Angstrom)
/// edge_len: the length of each edge vector (nedge Array, Unit: Angstrom)
/// ```
#[derive(Clone, Debug)]
pub struct PairGraph
{
    pub nedge: usize,
    pub edge_src: Vec<usize>,
    pub edge_dst: Vec<usize>,
    pub edge_vec: Array2<f64>,
    pub edge_len: Array1<f64>,
}





impl PairGraph
{
    /// Build the pair graph of the input structure under periodic boundary conditions
    ///
    /// # Parameters
    /// ```
    /// s: the input periodic structure
    /// cutoff: the cutoff radius of the neighbor search (Unit: Angstrom)
    /// ```
    ///
    /// # Examples
    /// ```no_run
    /// use ordnet::{graph::PairGraph, structure::Structure};
    /// let s: Structure = Structure::read_poscar("reference.vasp");
    /// let graph: PairGraph = PairGraph::build(&s, 4.0);
    /// ```
    pub fn build(s: &Structure, cutoff: f64) -> Self
    {
        let cutoff_powi2: f64 = cutoff.powi(2);
        let lattice: &Array2<f64> = &s.lattice;

        let mut edge_src: Vec<usize> = Vec::new();
        let mut edge_dst: Vec<usize> = Vec::new();
        let mut edge_vec_flat: Vec<f64> = Vec::new();
        let mut edge_len_flat: Vec<f64> = Vec::new();

        // For each center atom, scan all the atoms over the 3*3*3 periodic images
        for center in 0..s.natom
        {
            let mut nneighbor: usize = 0;
            for i in [0, -1, 1]
            {
                for j in [0, -1, 1]
                {
                    for k in [0, -1, 1]
                    {
                        let in_cell: bool = (i == 0) && (j == 0) && (k == 0);
                        for neighbor in 0..s.natom
                        {
                            // The center itself is not its own neighbor
                            if in_cell && (neighbor == center)
                            {
                                continue
                            }

                            let dx: f64 = s.coord[[neighbor,0]] + lattice[[0,0]] * (i as f64) + lattice[[1,0]] * (j as f64) + lattice[[2,0]] * (k as f64) - s.coord[[center,0]];
                            let dy: f64 = s.coord[[neighbor,1]] + lattice[[0,1]] * (i as f64) + lattice[[1,1]] * (j as f64) + lattice[[2,1]] * (k as f64) - s.coord[[center,1]];
                            let dz: f64 = s.coord[[neighbor,2]] + lattice[[0,2]] * (i as f64) + lattice[[1,2]] * (j as f64) + lattice[[2,2]] * (k as f64) - s.coord[[center,2]];
                            let dist_powi2: f64 = dx.powi(2) + dy.powi(2) + dz.powi(2);
                            if dist_powi2 < cutoff_powi2
                            {
                                edge_src.push(neighbor);
                                edge_dst.push(center);
                                edge_vec_flat.push(dx);
                                edge_vec_flat.push(dy);
                                edge_vec_flat.push(dz);
                                edge_len_flat.push(dist_powi2.sqrt());
                                nneighbor += 1;
                            }
                        }
                    }
                }
            }

            if nneighbor == 0
            {
                panic!("{}", error_isolated_atom(center, cutoff));
            }
        }

        let nedge: usize = edge_src.len();
        let edge_vec: Array2<f64> = Array2::from_shape_vec((nedge, 3), edge_vec_flat).expect(&error_none_value("edge_vec"));
        let edge_len: Array1<f64> = Array1::from_vec(edge_len_flat);

        PairGraph
        {
            nedge,
            edge_src,
            edge_dst,
            edge_vec,
            edge_len,
        }
    }



    /// Assemble the edge attributes (relative vector and distance) for the message passing
    pub fn edge_attr(&self) -> Array2<f64>
    {
        let mut attr: Array2<f64> = Array2::zeros((self.nedge, N_EDGE));
        for e in 0..self.nedge
        {
            attr[[e,0]] = self.edge_vec[[e,0]];
            attr[[e,1]] = self.edge_vec[[e,1]];
            attr[[e,2]] = self.edge_vec[[e,2]];
            attr[[e,3]] = self.edge_len[e];
        }

        attr
    }



    /// Assemble the 0/1 incidence matrix that sums the per-edge messages onto their center
    /// atoms: entry (e, a) is one when edge e points at center a
    ///
    /// # Parameters
    /// ```
    /// natom: the number of atoms of the underlying structure
    /// ```
    pub fn gather_matrix(&self, natom: usize) -> Array2<f64>
    {
        let mut gather: Array2<f64> = Array2::zeros((self.nedge, natom));
        for e in 0..self.nedge
        {
            gather[[e, self.edge_dst[e]]] = 1.0;
        }

        gather
    }
}
