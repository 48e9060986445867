//! End-to-end checks of the recovery pipeline on a small synthetic perovskite pair.

use ndarray::Array2;
use ordnet::common::constants::{N_OP, OUTPUT_AXIS_PERMUTATION, TWO_PI};
use ordnet::features;
use ordnet::graph::PairGraph;
use ordnet::io::input::Para;
use ordnet::matrix;
use ordnet::nn::model::DispNet;
use ordnet::nn::order_parameter::{freeze_mask, OrderParameter};
use ordnet::nn::training::{mean_absolute_error, train, RunSaved};
use ordnet::reconstruct::reconstruct;
use ordnet::structure::{align::displacement_field, Structure};
use savefile::{load_file, save_file};





/// A 2*2*2 supercell of the cubic perovskite, with the atoms grouped by species so the
/// oxygen sites occupy the indices 16..40
fn perovskite_supercell(a: f64) -> Structure
{
    let unit_frac: [([f64; 3], &str); 5] = [
        ([0.0, 0.0, 0.0], "Ca"),
        ([0.5, 0.5, 0.5], "Ti"),
        ([0.5, 0.5, 0.0], "O"),
        ([0.5, 0.0, 0.5], "O"),
        ([0.0, 0.5, 0.5], "O"),
    ];

    let mut atom_type: Vec<String> = Vec::with_capacity(40);
    let mut frac_flat: Vec<f64> = Vec::with_capacity(40 * 3);
    for species in ["Ca", "Ti", "O"]
    {
        for (site, symbol) in unit_frac.iter()
        {
            if *symbol != species
            {
                continue
            }
            for i in 0..2
            {
                for j in 0..2
                {
                    for k in 0..2
                    {
                        atom_type.push(String::from(*symbol));
                        frac_flat.push((site[0] + i as f64) / 2.0);
                        frac_flat.push((site[1] + j as f64) / 2.0);
                        frac_flat.push((site[2] + k as f64) / 2.0);
                    }
                }
            }
        }
    }

    let lattice: Array2<f64> = Array2::from_shape_vec((3, 3), vec![2.0*a, 0.0, 0.0, 0.0, 2.0*a, 0.0, 0.0, 0.0, 2.0*a]).unwrap();
    let frac: Array2<f64> = Array2::from_shape_vec((40, 3), frac_flat).unwrap();
    let coord: Array2<f64> = frac.dot(&lattice);

    Structure { natom: 40, lattice, atom_type, coord }
}



/// Distort the oxygen cage with an R-point-modulated pattern of fixed amplitude
fn distort(reference: &Structure, amplitude: f64) -> Structure
{
    let frac: Array2<f64> = reference.frac_coord();
    let mut coord: Array2<f64> = reference.coord.clone();
    for i in 16..40
    {
        let phase: f64 = 0.5 * (frac[[i,0]] + frac[[i,1]] + frac[[i,2]]);
        let modulation: f64 = (TWO_PI * phase).cos();
        coord[[i,0]] += amplitude * modulation;
        coord[[i,2]] -= 0.4 * amplitude * modulation;
    }

    Structure
    {
        natom: reference.natom,
        lattice: reference.lattice.clone(),
        atom_type: reference.atom_type.clone(),
        coord,
    }
}



fn test_para() -> Para
{
    let mut para: Para = Para::new();
    para.train_para.max_step = 50;
    para.train_para.print_step = 25;
    para.train_para.output_nn_sub_dir = String::from("test");
    para
}





#[test]
fn displacement_magnitudes_stay_below_the_search_radius()
{
    let reference: Structure = perovskite_supercell(3.85);
    let distorted: Structure = distort(&reference, 0.05);
    let para: Para = test_para();

    let displacement: Array2<f64> = displacement_field(&reference, &distorted, para.align_para.search_radius);
    for i in 0..reference.natom
    {
        let magnitude: f64 = (displacement[[i,0]].powi(2) + displacement[[i,1]].powi(2) + displacement[[i,2]].powi(2)).sqrt();
        assert!(magnitude < para.align_para.search_radius);
    }
}



#[test]
fn joint_training_reduces_the_reconstruction_loss()
{
    let reference: Structure = perovskite_supercell(3.85);
    let distorted: Structure = distort(&reference, 0.05);
    let para: Para = test_para();

    let displacement: Array2<f64> = displacement_field(&reference, &distorted, para.align_para.search_radius);
    let graph: PairGraph = PairGraph::build(&reference, para.graph_para.cutoff);

    let freeze: Array2<f64> = freeze_mask(para.feature_para.nrow, &para.feature_para.frozen_component);
    let mut net: DispNet = DispNet::new();
    let mut order: OrderParameter = OrderParameter::new(para.feature_para.nrow, &freeze, para.train_para.init_scale);

    let (loss_model, loss_order) = train(&para, &reference, &displacement, &graph, &mut net, &mut order);

    assert_eq!(loss_model.len(), para.train_para.max_step);
    for i in 0..loss_model.len()
    {
        assert!(loss_model[i].is_finite());
        assert!(loss_order[i].is_finite());
    }
    assert!(loss_model[loss_model.len()-1] < loss_model[0]);

    // The reconstruction keeps the lattice, the atom types, and the atom count
    let candidate: Structure = reconstruct(&reference, &graph, &net, &order, &para.feature_para, &para.recon_para);
    assert_eq!(candidate.natom, reference.natom);
    assert_eq!(candidate.atom_type, reference.atom_type);
    assert_eq!(candidate.coord.dim(), (40, 3));
}



#[test]
fn the_loss_is_sensitive_to_the_output_axis_permutation()
{
    let reference: Structure = perovskite_supercell(3.85);
    let distorted: Structure = distort(&reference, 0.05);
    let para: Para = test_para();

    let displacement: Array2<f64> = displacement_field(&reference, &distorted, para.align_para.search_radius);
    let graph: PairGraph = PairGraph::build(&reference, para.graph_para.cutoff);

    // A fresh, deterministic network and a zero order parameter give a generic prediction
    let net: DispNet = DispNet::new();
    let onehot: Array2<f64> = features::atom_type_onehot(&reference.atom_type, &para.feature_para.species);
    let site_weight: Array2<f64> = features::site_weight(&para.feature_para, &reference);
    let feature: Array2<f64> = features::compose(&onehot, &site_weight, &Array2::zeros((para.feature_para.nrow, N_OP)));
    let raw: Array2<f64> = net.predict(&feature, &graph);

    let declared: Array2<f64> = raw.dot(&matrix::permutation_matrix(&OUTPUT_AXIS_PERMUTATION));
    let identity: Array2<f64> = raw.dot(&matrix::permutation_matrix(&[0, 1, 2]));
    let loss_declared: f64 = mean_absolute_error(&declared, &displacement);
    let loss_identity: f64 = mean_absolute_error(&identity, &displacement);

    // Swapping the axis convention must change the loss, else a wrong permutation could
    // pass unnoticed
    assert!((loss_declared - loss_identity).abs() > 1e-12);
}



#[test]
fn the_run_bundle_survives_a_save_and_load_round_trip()
{
    let run: RunSaved = RunSaved
    {
        nrow: 2,
        ncomp: 3,
        order_parameter: vec![0.25, 0.0, -0.1, 0.0, 0.05, 0.0],
        loss_model: vec![0.4, 0.1, 0.03],
        loss_order: vec![0.5, 0.2, 0.04],
        space_group: 62,
    };

    let path: String = std::env::temp_dir().join("ordnet_run_bundle_test.bin").to_string_lossy().to_string();
    save_file(&path, 0, &run).unwrap();
    let loaded: RunSaved = load_file(&path, 0).unwrap();

    assert_eq!(loaded.nrow, run.nrow);
    assert_eq!(loaded.ncomp, run.ncomp);
    assert_eq!(loaded.order_parameter, run.order_parameter);
    assert_eq!(loaded.loss_model, run.loss_model);
    assert_eq!(loaded.space_group, run.space_group);
}
