//! Recover the symmetry-breaking order parameter connecting a high-symmetry reference
//! structure to a distorted structure, and validate it by space-group detection.

use std::fs;
use ndarray::Array2;
use savefile::save_file;
use ordnet::common::constants::N_OP;
use ordnet::common::error::*;
use ordnet::graph::PairGraph;
use ordnet::io::input::Para;
use ordnet::io::output;
use ordnet::nn::model::DispNet;
use ordnet::nn::order_parameter::{self, OrderParameter};
use ordnet::nn::training::{self, RunSaved};
use ordnet::reconstruct::reconstruct;
use ordnet::structure::{align, Structure};
use ordnet::symmetry;





fn main()
{
    println!("Begin order-parameter recovery");
    let para: Para = Para::new();
    let output_path: String = output::create_output_path(None);



    // Load the two structures and achieve the target displacement field
    let reference: Structure = Structure::read_poscar(&para.reference_file);
    let distorted: Structure = Structure::read_poscar(&para.distorted_file);
    let displacement: Array2<f64> = align::displacement_field(&reference, &distorted, para.align_para.search_radius);

    // Build the pair graph of the reference structure
    let graph: PairGraph = PairGraph::build(&reference, para.graph_para.cutoff);



    // Initialize the network and the order parameter, resuming from the input checkpoint
    // when one is present
    let freeze: Array2<f64> = order_parameter::freeze_mask(para.feature_para.nrow, &para.feature_para.frozen_component);
    let input_checkpoint: String = format!("nn/{}/Order_Parameter.safetensors", para.train_para.input_nn_sub_dir);
    let checkpoint_exist = fs::metadata(&input_checkpoint);
    let (mut net, mut order): (DispNet, OrderParameter) = match checkpoint_exist
    {
        Ok(_) =>
        {
            let net: DispNet = DispNet::load(&para.train_para.input_nn_sub_dir);
            let order: OrderParameter = OrderParameter::load(&para.train_para.input_nn_sub_dir, para.feature_para.nrow, &freeze);
            (net, order)
        },
        Err(_) =>
        {
            let net: DispNet = DispNet::new();
            let order: OrderParameter = OrderParameter::new(para.feature_para.nrow, &freeze, para.train_para.init_scale);
            (net, order)
        },
    };



    // Jointly train the network and the order parameter against the displacement field
    let (loss_model, loss_order) = training::train(&para, &reference, &displacement, &graph, &mut net, &mut order);



    // Rebuild the candidate distorted structure and validate its symmetry
    let candidate: Structure = reconstruct(&reference, &graph, &net, &order, &para.feature_para, &para.recon_para);
    let structure_file: String = format!("{}{}", output_path, para.output_structure_file);
    candidate.write_poscar(&structure_file, "structure reconstructed from the recovered order parameter");

    let reference_group: i32 = symmetry::space_group_number(&reference, para.recon_para.symprec);
    let target_group: i32 = symmetry::space_group_number(&distorted, para.recon_para.symprec);
    let candidate_group: i32 = symmetry::space_group_number(&candidate, para.recon_para.symprec);
    println!("space group    reference {:4}    target {:4}    reconstructed {:4}", reference_group, target_group, candidate_group);



    // Persist the trained result
    net.save(&para.train_para.output_nn_sub_dir);
    order.save(&para.train_para.output_nn_sub_dir);

    let values: Array2<f64> = order.values_host();
    let run: RunSaved = RunSaved
    {
        nrow: para.feature_para.nrow,
        ncomp: N_OP,
        order_parameter: values.iter().cloned().collect(),
        loss_model,
        loss_order,
        space_group: candidate_group,
    };
    let run_file: String = format!("{}{}", output_path, para.run_output_file);
    save_file(&run_file, 0, &run).expect(&error_file("creating", &run_file));
    output::write_run_summary(&format!("{}run_summary.out", output_path), &run.loss_model, &run.loss_order, candidate_group);

    println!("Finalization done");
}
