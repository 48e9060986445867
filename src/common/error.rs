//! About the warning and error information when an interrupt occurs at running time.





/// Error message for File reading, creating, opening, and writing.
pub fn error_file(operation: &str, filename: &str) -> String
{
    format!("\n\n\n ERROR: There is some problem in {} the file '{}'. \n\n\n", operation, filename)
}

/// Error message for reading function
pub fn error_read(filename: &str) -> String
{
    format!("\n\n\n ERROR: There is some problem with the input file '{}'. Please check it. \n\n\n", filename)
}

/// Error message for Directory creating
pub fn error_dir(operation: &str, dir: &str) -> String
{
    format!("\n\n\n ERROR: There is some problem in {} the directory '{}'. Maybe it already exists or you have no permission. \n\n\n", operation, dir)
}





/// Error message for `Some<A>`, Result<T, E>
pub fn error_none_value(variable: &str) -> String
{
    format!("\n\n\n ERROR: There is some problem with variable '{}', which has none/wrong value. \n\n\n", variable)
}

/// Error message for as_slice() and as_slice_mut()
pub fn error_as_slice(variable: &str) -> String
{
    format!("\n\n\n ERROR: There is some problem in getting the slice of the variable '{}'. \n\n\n", variable)
}





/// Error message for an element symbol that is absent from the static atomic number map
pub fn error_element_symbol(symbol: &str) -> String
{
    format!("\n\n\n ERROR: The element symbol '{}' has read from the structure file, but it's not in the static atomic number map. Please check it. \n\n\n", symbol)
}

/// Error message for an atom type that is absent from the declared species ordering
pub fn error_species(symbol: &str) -> String
{
    format!("\n\n\n ERROR: The atom type '{}' is not contained in the declared species ordering of the feature layout. Please check it. \n\n\n", symbol)
}

/// Error message for two structures whose atom counts disagree
pub fn error_atom_count(natom1: usize, natom2: usize) -> String
{
    format!("\n\n\n ERROR: The reference structure has '{}' atoms but the distorted structure has '{}'. The two structures should share a one-to-one atom correspondence. Please check them. \n\n\n", natom1, natom2)
}

/// Error message for a singular lattice matrix
pub fn error_singular_lattice() -> String
{
    format!("\n\n\n ERROR: The lattice matrix is singular, so the fractional coordinates can't be achieved. Please check the structure file. \n\n\n")
}





/// Error message for a reference atom without any distorted-structure image within the search radius
pub fn error_no_image(atom: usize, radius: f64) -> String
{
    format!("\n\n\n ERROR: No periodic image of the distorted structure lies within '{}' Angstrom around the reference atom '{}'. The two structures are misaligned or wrongly ordered. Please check them. \n\n\n", radius, atom)
}

/// Error message for a distorted-structure site that is claimed by two reference atoms
pub fn error_injective(atom1: usize, atom2: usize, site: usize) -> String
{
    format!("\n\n\n ERROR: The reference atoms '{}' and '{}' both map onto the distorted-structure site '{}', so the displacement assignment is not one-to-one. Please check the structures. \n\n\n", atom1, atom2, site)
}

/// Error message for an atom without any neighbor within the cutoff radius
pub fn error_isolated_atom(atom: usize, cutoff: f64) -> String
{
    format!("\n\n\n ERROR: The atom '{}' has no neighbor within the cutoff radius '{}' Angstrom, so no message can reach it. Please enlarge the cutoff. \n\n\n", atom, cutoff)
}

/// Error message for an order-parameter layout that disagrees with the declared site weighting
pub fn error_order_layout(nrow1: usize, nrow2: usize) -> String
{
    format!("\n\n\n ERROR: The order-parameter tensor has '{}' rows but the site weighting declares '{}'. Please check the feature parameters. \n\n\n", nrow1, nrow2)
}





/// Error message for parameters updating in NN training
pub fn error_nn_para_update(optimizer: &str, network: &str) -> String
{
    format!("\n\n\n ERROR: There is some problem in updating the parameters of '{}' using the optimizer '{}'. Please check it. \n\n\n", network, optimizer)
}

/// Error message for the space-group detection of a structure
pub fn error_symmetry_detection(symprec: f64) -> String
{
    format!("\n\n\n ERROR: There is some problem in detecting the space group with the tolerance '{}'. Please check the structure and the tolerance. \n\n\n", symprec)
}
