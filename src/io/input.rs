//! About the run parameters.
use crate::common::constants::N_OP;





/// The structure containing the parameters of the structure alignment.
///
/// # Fields
/// ```
/// search_radius: the radius of the nearest-image search around each reference atom (Unit: Angstrom)
/// ```
#[derive(Clone)]
pub struct AlignPara
{
    pub search_radius: f64,
}





/// The structure containing the parameters of the neighbor-graph construction.
///
/// # Fields
/// ```
/// cutoff: the cutoff radius of the periodic neighbor search (Unit: Angstrom)
/// ```
#[derive(Clone)]
pub struct GraphPara
{
    pub cutoff: f64,
}





/// The structure containing the parameters of the feature layout.
///
/// # Fields
/// ```
/// species: the declared species ordering of the one-hot block (N_TYPE Vec)
/// special_site: the atom indices carrying an order-parameter contribution
/// site_row: for each special site, the order-parameter row assigned to it (only the direct variant)
/// nrow: the number of rows of the order-parameter tensor
/// kvector: the fixed periodicity vectors of the k-vector variant; None selects the direct variant
/// frozen_component: the order-parameter components clamped to zero on every row
/// order_l: the symmetry order of each order-parameter component
/// ```
#[derive(Clone)]
pub struct FeaturePara
{
    pub species: Vec<String>,
    pub special_site: Vec<usize>,
    pub site_row: Vec<usize>,
    pub nrow: usize,
    pub kvector: Option< Vec<[f64; 3]> >,
    pub frozen_component: Vec<usize>,
    pub order_l: [f64; N_OP],
}





/// The structure containing the parameters of the joint training.
///
/// # Fields
/// ```
/// max_step: the fixed iteration budget of the joint optimization
/// print_step: the cadence of the diagnostic logging and the checkpointing
/// model_lr: the learning rate of the network parameter group
/// order_lr: the learning rate of the order-parameter group
/// lambda: the weight of the sparsity regularization in the order-update phase
/// order_power: the exponent of the power-law weighting of the regularization
/// init_scale: the half-width of the random order-parameter initialization
/// input_nn_sub_dir: specify the sub-directory (the path with respect to directory 'nn') where to load the pretrained network
/// output_nn_sub_dir: specify the sub-directory (the path with respect to directory 'nn') where to save the network during training
/// ```
#[derive(Clone)]
pub struct TrainPara
{
    pub max_step: usize,
    pub print_step: usize,
    pub model_lr: f64,
    pub order_lr: f64,
    pub lambda: f64,
    pub order_power: i32,
    pub init_scale: f64,
    pub input_nn_sub_dir: String,
    pub output_nn_sub_dir: String,
}





/// The structure containing the parameters of the reconstruction and validation.
///
/// # Fields
/// ```
/// symprec: the numeric tolerance handed to the space-group detection; the reported group depends on it materially
/// round_digit: the number of decimals the final order parameter is rounded to before the readout (None keeps it unrounded)
/// ```
#[derive(Clone)]
pub struct ReconPara
{
    pub symprec: f64,
    pub round_digit: Option<i32>,
}





#[derive(Clone)]
pub struct Para
{
    // Input and output files
    pub reference_file: String,
    pub distorted_file: String,
    pub output_structure_file: String,
    pub run_output_file: String,

    // Alignment parameters
    pub align_para: AlignPara,

    // Neighbor-graph parameters
    pub graph_para: GraphPara,

    // Feature-layout parameters
    pub feature_para: FeaturePara,

    // Joint-training parameters
    pub train_para: TrainPara,

    // Reconstruction parameters
    pub recon_para: ReconPara,
}





impl Para
{
    pub fn new() -> Self
    {
        Para
        {
            // Input and output files
            reference_file: String::from("reference.vasp"),
            distorted_file: String::from("distorted.vasp"),
            output_structure_file: String::from("reconstructed.vasp"),
            run_output_file: String::from("run.bin"),

            // Alignment parameters
            align_para: AlignPara
            {
                search_radius: 1.0,
            },

            // Neighbor-graph parameters
            graph_para: GraphPara
            {
                cutoff: 4.0,
            },

            // Feature-layout parameters: a 2*2*2 perovskite supercell with the 24 oxygen
            // sites modulated by the R-point and M-point periodicity vectors
            feature_para: FeaturePara
            {
                species: vec![String::from("Ca"), String::from("Ti"), String::from("O")],
                special_site: (16..40).collect(),
                site_row: Vec::new(),
                nrow: 2,
                kvector: Some(vec![[0.5, 0.5, 0.5], [0.5, 0.5, 0.0]]),
                frozen_component: Vec::new(),
                order_l: [1.0, 2.0, 3.0],
            },

            // Joint-training parameters
            train_para: TrainPara
            {
                max_step: 2000,
                print_step: 100,
                model_lr: 0.001,
                order_lr: 0.005,
                lambda: 0.01,
                order_power: 6,
                init_scale: 0.1,
                input_nn_sub_dir: String::from(""),
                output_nn_sub_dir: String::from("new"),
            },

            // Reconstruction parameters
            recon_para: ReconPara
            {
                symprec: 0.001,
                round_digit: Some(2),
            },
        }
    }
}
