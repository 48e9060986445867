//! Contains mathematical constants, the feature layout, and the static chemical data.
use crate::common::error::*;
use phf::phf_map;




#[cfg(not(feature = "cuda"))]
pub type Device = dfdx::tensor::Cpu;
#[cfg(feature = "cuda")]
pub type Device = dfdx::tensor::Cuda;










// Mathematical
pub const PI: f64 = 3.141592653589793;
pub const TWO_PI: f64 = 2.0 * PI;










// Feature layout

/// Number of atom types carried by the one-hot block of the per-atom features
pub const N_TYPE: usize = 3;
/// Number of components of the order-parameter block of the per-atom features
pub const N_OP: usize = 3;
/// Whole number of the per-atom features
pub const N_FEAT: usize = N_TYPE + N_OP;
/// Number of edge attributes (relative vector and distance) for the message passing
pub const N_EDGE: usize = 4;

/// The network emits the three displacement components in the (y, z, x) ordering of its
/// vector irrep, so component k of the physical (x, y, z) displacement is read from
/// network component OUTPUT_AXIS_PERMUTATION[k]. Every consumer of the network output
/// goes through this one constant.
pub const OUTPUT_AXIS_PERMUTATION: [usize; 3] = [2, 0, 1];










// Chemical

// 'ATOMIC_NUMBER' is a static structure of type 'phf::Map', initialized by macro 'phf_map'
static ATOMIC_NUMBER: phf::Map<&'static str, i32> = phf_map!
{
    "H" => 1,
    "He" => 2,

    "Li" => 3,
    "Be" => 4,
    "B" => 5,
    "C" => 6,
    "N" => 7,
    "O" => 8,
    "F" => 9,
    "Ne" => 10,

    "Na" => 11,
    "Mg" => 12,
    "Al" => 13,
    "Si" => 14,
    "P" => 15,
    "S" => 16,
    "Cl" => 17,
    "Ar" => 18,

    "K" => 19,
    "Ca" => 20,
    "Sc" => 21,
    "Ti" => 22,
    "V" => 23,
    "Cr" => 24,
    "Mn" => 25,
    "Fe" => 26,
    "Co" => 27,
    "Ni" => 28,
    "Cu" => 29,
    "Zn" => 30,
    "Ga" => 31,
    "Ge" => 32,
    "As" => 33,
    "Se" => 34,
    "Br" => 35,
    "Kr" => 36,

    "Rb" => 37,
    "Sr" => 38,
    "Y" => 39,
    "Zr" => 40,
    "Nb" => 41,
    "Mo" => 42,
    "Tc" => 43,
    "Ru" => 44,
    "Rh" => 45,
    "Pd" => 46,
    "Ag" => 47,
    "Cd" => 48,
    "In" => 49,
    "Sn" => 50,
    "Sb" => 51,
    "Te" => 52,
    "I" => 53,
    "Xe" => 54,

    "Cs" => 55,
    "Ba" => 56,
    "La" => 57,
    "Ce" => 58,
    "Pr" => 59,
    "Nd" => 60,
    "Pm" => 61,
    "Sm" => 62,
    "Eu" => 63,
    "Gd" => 64,
    "Tb" => 65,
    "Dy" => 66,
    "Ho" => 67,
    "Er" => 68,
    "Tm" => 69,
    "Yb" => 70,
    "Lu" => 71,
    "Hf" => 72,
    "Ta" => 73,
    "W" => 74,
    "Re" => 75,
    "Os" => 76,
    "Ir" => 77,
    "Pt" => 78,
    "Au" => 79,
    "Hg" => 80,
    "Tl" => 81,
    "Pb" => 82,
    "Bi" => 83,
    "Po" => 84,
    "At" => 85,
    "Rn" => 86,

    "Fr" => 87,
    "Ra" => 88,
    "Ac" => 89,
    "Th" => 90,
    "Pa" => 91,
    "U" => 92,
    "Np" => 93,
    "Pu" => 94,
};





/// Input an element symbol, get its atomic number from the static map 'ATOMIC_NUMBER'
///
/// # Parameters
/// ```
/// symbol: the input element symbol (e.g. "Ca", "Ti", "O")
/// ```
///
/// # Examples
/// ```
/// use ordnet::common::constants::atomic_number;
/// assert_eq!(atomic_number("Ti"), 22);
/// ```
pub fn atomic_number(symbol: &str) -> i32
{
    match ATOMIC_NUMBER.get(symbol)
    {
        Some(z) => *z,
        None => panic!("{}", error_element_symbol(symbol)),
    }
}
