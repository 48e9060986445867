//! Joint training of the displacement network and the order-parameter values.
//!
//! Every iteration runs two strictly separated phases. The model-update phase freezes the
//! order parameter: the features are composed off-tape, the network prediction is compared
//! against the target displacement field, and one Adam step is applied to the network
//! weights only. The order-update phase recomposes the features on the order-parameter
//! tape, adds the sparsity regularization, and applies one Adam step to the order
//! parameter only. The loop runs for a fixed iteration budget; a diverging loss is not
//! caught.
use crate::common::constants::{Device, N_EDGE, N_FEAT, N_OP, OUTPUT_AXIS_PERMUTATION};
use crate::common::error::*;
use crate::features;
use crate::graph::PairGraph;
use crate::io::input::Para;
use crate::matrix;
use crate::nn::model::{DispAdam, DispNet};
use crate::nn::order_parameter::{self, OrderParameter};
use crate::structure::Structure;
use std::fs;
use std::fs::File;
use std::io::Write;
use ndarray::Array2;
use dfdx::losses::mae_loss;
use dfdx::nn::ZeroGrads;
use dfdx::optim::{Adam, Optimizer};
use dfdx::shapes::{Const, Rank0};
use dfdx::tensor::{AsArray, Gradients, Tensor, TensorFromVec, Trace};
use dfdx::tensor_ops::{AdamConfig, Backward, SumTo, TryMatMul};
use savefile_derive::Savefile;





/// The basic structure reserving the result of a recovery run, which is going to be saved
/// into the disk
///
/// # Fields
/// ```
/// nrow: the number of rows of the recovered order-parameter tensor
/// ncomp: the number of components of the recovered order-parameter tensor
/// order_parameter: the recovered order-parameter values (nrow*ncomp Vec)
/// loss_model: the model-phase losses of all the steps (Unit: Angstrom)
/// loss_order: the order-phase losses of all the steps, including the regularization
/// space_group: the space-group number detected on the reconstructed structure
/// ```
#[derive(Debug, Savefile)]
pub struct RunSaved
{
    pub nrow: usize,
    pub ncomp: usize,
    pub order_parameter: Vec<f64>,
    pub loss_model: Vec<f64>,
    pub loss_order: Vec<f64>,
    pub space_group: i32,
}





/// The mean absolute error between two displacement fields (Unit: Angstrom)
pub fn mean_absolute_error(predicted: &Array2<f64>, target: &Array2<f64>) -> f64
{
    let mut error: f64 = 0.0;
    for i in 0..predicted.nrows()
    {
        for j in 0..predicted.ncols()
        {
            error += (predicted[[i,j]] - target[[i,j]]).abs();
        }
    }

    error / ((predicted.nrows() * predicted.ncols()) as f64)
}










/// Jointly train the displacement network and the order parameter against the target
/// displacement field
///
/// # Parameters
/// ```
/// para: the input run parameters
/// reference: the input high-symmetry reference structure
/// displacement: the fixed target displacement field (natom*3 Array, Unit: Angstrom)
/// graph: the pair graph of the reference structure
/// net: the input mutable displacement network
/// order: the input mutable order parameter
/// loss_model: the output model-phase losses of all the steps
/// loss_order: the output order-phase losses of all the steps
/// ```
///
/// # Examples
/// ```no_run
/// # use ordnet::{graph::PairGraph, io::input::Para, structure::{Structure, align}};
/// # use ordnet::nn::{model::DispNet, order_parameter::{self, OrderParameter}, training::train};
/// # let para: Para = Para::new();
/// # let reference = Structure::read_poscar("reference.vasp");
/// # let distorted = Structure::read_poscar("distorted.vasp");
/// # let displacement = align::displacement_field(&reference, &distorted, 1.0);
/// # let graph = PairGraph::build(&reference, 4.0);
/// # let mask = order_parameter::freeze_mask(2, &[]);
/// let mut net: DispNet = DispNet::new();
/// let mut order: OrderParameter = OrderParameter::new(2, &mask, 0.1);
/// let (loss_model, loss_order) = train(&para, &reference, &displacement, &graph, &mut net, &mut order);
/// ```
pub fn train(
    para: &Para,
    reference: &Structure,
    displacement: &Array2<f64>,
    graph: &PairGraph,
    net: &mut DispNet,
    order: &mut OrderParameter,
) -> (Vec<f64>, Vec<f64>)
{
    // Define a Device (CPU or Cuda) to build tensors
    let dev: Device = Device::seed_from_u64(1314);
    let natom: usize = reference.natom;

    // Assemble the host-side feature blocks of the reference structure
    let onehot: Array2<f64> = features::atom_type_onehot(&reference.atom_type, &para.feature_para.species);
    let site_weight: Array2<f64> = features::site_weight(&para.feature_para, reference);
    let freeze: Array2<f64> = order_parameter::freeze_mask(para.feature_para.nrow, &para.feature_para.frozen_component);
    let reg_weight: Array2<f64> = order_parameter::regularization_weight_matrix(para.feature_para.nrow, &para.feature_para.order_l, para.train_para.order_power);

    // Transfer the fixed tensors to the device once
    let onehot_t = features::onehot_padded_tensor(&onehot, &dev);
    let weight_t = features::site_weight_tensor(&site_weight, &dev);
    let selector_t = features::component_selector(&dev);
    let mask_t: Tensor<(usize, Const<N_OP>), f64, Device> = dev.tensor_from_vec(freeze.iter().cloned().collect(), (para.feature_para.nrow, Const::<N_OP>));
    let reg_weight_t: Tensor<(usize, Const<N_OP>), f64, Device> = dev.tensor_from_vec(reg_weight.iter().cloned().collect(), (para.feature_para.nrow, Const::<N_OP>));
    let attr: Array2<f64> = graph.edge_attr();
    let edge_attr_t: Tensor<(usize, Const<N_EDGE>), f64, Device> = dev.tensor_from_vec(attr.iter().cloned().collect(), (graph.nedge, Const::<N_EDGE>));
    let edge_src_t: Tensor<(usize,), usize, Device> = dev.tensor_from_vec(graph.edge_src.clone(), (graph.nedge,));
    let gather: Array2<f64> = graph.gather_matrix(natom);
    let gather_center_t: Tensor<(usize, usize), f64, Device> = dev.tensor_from_vec(gather.iter().cloned().collect(), (graph.nedge, natom));
    let target_t: Tensor<(usize, Const<3>), f64, Device> = dev.tensor_from_vec(displacement.iter().cloned().collect(), (natom, Const::<3>));
    let permutation: Array2<f64> = matrix::permutation_matrix(&OUTPUT_AXIS_PERMUTATION);
    let permutation_t: Tensor<(Const<3>, Const<3>), f64, Device> = dev.tensor_from_vec(permutation.iter().cloned().collect(), (Const::<3>, Const::<3>));

    // Define the Adam optimizers of the two parameter groups
    let model_adam_config: AdamConfig = AdamConfig
    {
        lr: para.train_para.model_lr,
        betas: [0.9, 0.999],
        eps: 0.00000001,
        weight_decay: None,
    };
    let order_adam_config: AdamConfig = AdamConfig
    {
        lr: para.train_para.order_lr,
        betas: [0.9, 0.999],
        eps: 0.00000001,
        weight_decay: None,
    };
    let mut disp_adam: DispAdam = DispAdam::new(net, model_adam_config);
    let mut order_adam: Adam<OrderParameter, f64, Device> = Adam::new(order, order_adam_config);

    // Allocate the gradients of the two parameter groups
    let mut model_grads: Gradients<f64, Device> = net.alloc_grads();
    let mut order_grads: Gradients<f64, Device> = order.alloc_grads();

    // If directory 'nn/para.train_para.output_nn_sub_dir' already exist, do nothing; otherwise, create the directory
    let output_nn_dir: String = format!("nn/{}", para.train_para.output_nn_sub_dir);
    let output_nn_dir_exist = fs::metadata(&output_nn_dir);
    match output_nn_dir_exist
    {
        Ok(_) => (),
        Err(_) => fs::create_dir_all(&output_nn_dir).expect(&error_dir("creating", &output_nn_dir)),
    }
    // Specify the training output file and output the header into it
    let training_output_file: String = format!("{}/training.out", &output_nn_dir);
    let mut training_output = File::create(&training_output_file).expect(&error_file("creating", &training_output_file));
    training_output.write_all(b"  step              model_loss              order_loss\n").expect(&error_file("writing", &training_output_file));

    // Train the network and the order parameter alternately
    let mut loss_model: Vec<f64> = Vec::with_capacity(para.train_para.max_step);
    let mut loss_order: Vec<f64> = Vec::with_capacity(para.train_para.max_step);
    for i in 1..(para.train_para.max_step+1)
    {
        // Model-update phase: compose the features off-tape, so the order parameter stays
        // frozen, and backpropagate the reconstruction loss into the network weights only
        let feature: Tensor<(usize, Const<N_FEAT>), f64, Device> = features::compose_on_tape(order.values.clone(), &mask_t, &selector_t, &weight_t, &onehot_t);
        let predicted = net.forward(
            feature.trace(model_grads.clone()),
            feature.trace(model_grads.clone()),
            edge_attr_t.trace(model_grads.clone()),
            &edge_src_t,
            &gather_center_t,
        );
        let predicted = predicted.matmul(permutation_t.clone());
        let model_loss = mae_loss(predicted, target_t.clone());
        let model_loss_value: f64 = model_loss.array();
        model_grads = model_loss.backward();
        disp_adam.update(net, &model_grads);
        net.zero_grads(&mut model_grads);

        // Order-update phase: recompose the features on the order-parameter tape with the
        // updated network weights, add the sparsity regularization, and backpropagate into
        // the order parameter only
        let predicted = net.forward(
            features::compose_on_tape(order.values.trace(order_grads.clone()), &mask_t, &selector_t, &weight_t, &onehot_t),
            features::compose_on_tape(order.values.trace(order_grads.clone()), &mask_t, &selector_t, &weight_t, &onehot_t),
            edge_attr_t.trace(order_grads.clone()),
            &edge_src_t,
            &gather_center_t,
        );
        let predicted = predicted.matmul(permutation_t.clone());
        let reconstruction_loss = mae_loss(predicted, target_t.clone());
        let penalty = (order.values.trace(order_grads.clone()) * mask_t.clone()).abs() * reg_weight_t.clone();
        let order_loss = reconstruction_loss + penalty.sum::<Rank0, _>() * para.train_para.lambda;
        let order_loss_value: f64 = order_loss.array();
        order_grads = order_loss.backward();
        order_adam.update(order, &order_grads).expect(&error_nn_para_update("Adam", "Order Parameter"));
        order.zero_grads(&mut order_grads);

        // Output the losses in the current step, and save the network and the order
        // parameter in the print step
        loss_model.push(model_loss_value);
        loss_order.push(order_loss_value);
        training_output.write_all(format!("{:6} {:23.8} {:23.8}\n", i, model_loss_value, order_loss_value).as_bytes()).expect(&error_file("writing", &training_output_file));
        if (i % para.train_para.print_step) == 0
        {
            println!("step {:6}    model_loss {:15.8}    order_loss {:15.8}", i, model_loss_value, order_loss_value);
            net.save(&para.train_para.output_nn_sub_dir);
            order.save(&para.train_para.output_nn_sub_dir);
        }
    }

    (loss_model, loss_order)
}
