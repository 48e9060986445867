//! About the periodic crystal structures and their file representation.

pub mod align;

use crate::common::error::*;
use crate::matrix;
use std::fs::File;
use std::io::{BufReader, Write};
use ndarray::Array2;
use vasp_poscar::{Builder, Coords, Poscar};





/// The basic structure describing a periodic crystal.
///
/// # Fields
/// ```
/// natom: the number of atoms in the crystal
/// lattice: the unit cell of the crystal (3*3 Array, rows are the lattice vectors, Unit: Angstrom)
/// atom_type: the element symbols of the atoms in the crystal (natom Vec)
/// coord: the Cartesian coordinates of the atoms in the crystal (natom*3 Array, Unit: Angstrom)
/// ```
#[derive(Clone, Debug)]
pub struct Structure
{
    pub natom: usize,
    pub lattice: Array2<f64>,
    pub atom_type: Vec<String>,
    pub coord: Array2<f64>,
}





impl Structure
{
    /// Read a structure from a POSCAR file
    ///
    /// # Parameters
    /// ```
    /// filename: name of the POSCAR file to read from
    /// ```
    ///
    /// # Examples
    /// ```no_run
    /// use ordnet::structure::Structure;
    /// let s: Structure = Structure::read_poscar("reference.vasp");
    /// ```
    pub fn read_poscar(filename: &str) -> Self
    {
        let file: File = File::open(filename).expect(&error_file("opening", filename));
        let poscar: Poscar = Poscar::from_reader(BufReader::new(file)).expect(&error_read(filename));

        // Achieve the lattice matrix
        let lattice_vectors: [[f64; 3]; 3] = poscar.scaled_lattice_vectors();
        let mut lattice: Array2<f64> = Array2::zeros((3, 3));
        for i in 0..3
        {
            for j in 0..3
            {
                lattice[[i,j]] = lattice_vectors[i][j];
            }
        }

        // Achieve the element symbol of each atom from the species groups
        let group_symbols: Vec<String> = match poscar.group_symbols()
        {
            Some(symbols) => symbols.map(|s| s.to_string()).collect(),
            None => panic!("{}", error_read(filename)),
        };
        let group_counts: Vec<usize> = poscar.group_counts().collect();
        let mut atom_type: Vec<String> = Vec::new();
        for i in 0..group_symbols.len()
        {
            for _ in 0..group_counts[i]
            {
                atom_type.push(group_symbols[i].clone());
            }
        }
        let natom: usize = atom_type.len();

        // Achieve the Cartesian coordinates
        let (positions, is_frac): (Vec<[f64; 3]>, bool) = match poscar.scaled_positions()
        {
            Coords::Cart(positions) => (positions.to_vec(), false),
            Coords::Frac(positions) => (positions.to_vec(), true),
        };
        let mut coord: Array2<f64> = Array2::zeros((natom, 3));
        for i in 0..natom
        {
            coord[[i,0]] = positions[i][0];
            coord[[i,1]] = positions[i][1];
            coord[[i,2]] = positions[i][2];
        }
        if is_frac
        {
            coord = matrix::frac_to_cart(&lattice, &coord);
        }

        Structure
        {
            natom,
            lattice,
            atom_type,
            coord,
        }
    }



    /// Create a new POSCAR file (if already existed, truncate it), and write the structure into it
    ///
    /// # Parameters
    /// ```
    /// filename: name of the POSCAR file to be writen
    /// comment: the comment line of the POSCAR file
    /// ```
    ///
    /// # Examples
    /// ```no_run
    /// # use ordnet::structure::Structure;
    /// # let s: Structure = Structure::read_poscar("reference.vasp");
    /// s.write_poscar("reconstructed.vasp", "reconstructed structure");
    /// ```
    pub fn write_poscar(&self, filename: &str, comment: &str)
    {
        let mut lattice_vectors: [[f64; 3]; 3] = [[0.0; 3]; 3];
        for i in 0..3
        {
            for j in 0..3
            {
                lattice_vectors[i][j] = self.lattice[[i,j]];
            }
        }

        let mut positions: Vec<[f64; 3]> = Vec::with_capacity(self.natom);
        for i in 0..self.natom
        {
            positions.push([self.coord[[i,0]], self.coord[[i,1]], self.coord[[i,2]]]);
        }

        let poscar: Poscar = Builder::new()
            .comment(comment)
            .lattice_vectors(&lattice_vectors)
            .positions(Coords::Cart(positions))
            .site_symbols(self.atom_type.iter().map(|symbol| symbol.as_str()))
            .build()
            .expect(&error_none_value("poscar"));

        let mut file: File = File::create(filename).expect(&error_file("creating", filename));
        file.write_all(format!("{}", poscar).as_bytes()).expect(&error_file("writing", filename));
    }



    /// Achieve the fractional coordinates of the atoms with respect to the lattice
    pub fn frac_coord(&self) -> Array2<f64>
    {
        matrix::cart_to_frac(&self.lattice, &self.coord)
    }
}
