//! Initialization, saving, loading, and evaluation of the displacement network.
//!
//! The network is a single round of message passing over the periodic pair graph: every
//! edge turns its source-atom features and its geometric attributes into a message, the
//! messages are summed onto their center atoms, and a readout head maps each atom's own
//! features together with its summed message onto a displacement 3-vector. The vector
//! components leave the network in its internal (y, z, x) ordering; consumers align them
//! with the physical axes through the one declared permutation constant.

use crate::common::constants::{Device, N_EDGE, N_FEAT};
use crate::common::error::*;
use crate::graph::PairGraph;
use std::fs;
use ndarray::Array2;
use dfdx::nn::modules::{AddInto, Linear, Tanh};
use dfdx::nn::{BuildModule, LoadFromSafetensors, Module, SaveToSafetensors, ZeroGrads};
use dfdx::optim::{Adam, Optimizer};
use dfdx::shapes::{Axes2, Const, Rank0};
use dfdx::tensor::{Gradients, Merge, NoneTape, OwnedTape, Tape, Tensor, TensorFromVec, Trace, ZerosTensor};
use dfdx::tensor_ops::{AdamConfig, Backward, GatherTo, PermuteTo, TryMatMul};





pub const N_HIDDEN: usize = 64;

// Define the NN modules for the edge messages and for the per-atom readout
pub type MessageNN =
(
    AddInto< (Linear<N_FEAT, N_HIDDEN, f64, Device>, Linear<N_EDGE, N_HIDDEN, f64, Device>) >,
    Tanh,
    Linear<N_HIDDEN, N_HIDDEN, f64, Device>,
    Tanh,
);

pub type ReadoutNN =
(
    AddInto< (Linear<N_FEAT, N_HIDDEN, f64, Device>, Linear<N_HIDDEN, N_HIDDEN, f64, Device>) >,
    Tanh,
    Linear<N_HIDDEN, 16, f64, Device>,
    Tanh,
    Linear<16, 3, f64, Device>,
);





/// The displacement network, containing the message sub-NN and the readout sub-NN
///
/// # Fields
/// ```
/// message_nn: the sub-NN turning (source features, edge attributes) into edge messages
/// readout_nn: the sub-NN turning (atom features, summed messages) into a displacement 3-vector
/// ```
pub struct DispNet
{
    pub message_nn: MessageNN,
    pub readout_nn: ReadoutNN,
}





/// The Adam optimizers for the two sub-NNs of the displacement network
pub struct DispAdam
{
    pub message_adam: Adam<MessageNN, f64, Device>,
    pub readout_adam: Adam<ReadoutNN, f64, Device>,
}










impl DispNet
{
    /// Construct a new displacement network
    pub fn new() -> Self
    {
        // Define a Device (CPU or Cuda) to build NNs
        let dev: Device = Device::seed_from_u64(1314);

        let message_nn: MessageNN = BuildModule::build(&dev);
        let readout_nn: ReadoutNN = BuildModule::build(&dev);

        DispNet
        {
            message_nn,
            readout_nn,
        }
    }



    /// One forward pass over the whole structure
    ///
    /// # Parameters
    /// ```
    /// node_feature: the per-atom features feeding the readout branch (natom*N_FEAT)
    /// edge_feature: the per-atom features gathered onto the edge sources (natom*N_FEAT)
    /// edge_attr: the edge attributes (nedge*N_EDGE)
    /// edge_src: the source atom index of each edge (nedge)
    /// gather_center: the incidence matrix summing edge messages onto their centers (nedge*natom)
    /// predicted: the output displacement components in the network ordering (natom*3)
    /// ```
    pub fn forward<T>(
        &self,
        node_feature: Tensor<(usize, Const<N_FEAT>), f64, Device, T>,
        edge_feature: Tensor<(usize, Const<N_FEAT>), f64, Device, T>,
        edge_attr: Tensor<(usize, Const<N_EDGE>), f64, Device, T>,
        edge_src: &Tensor<(usize,), usize, Device>,
        gather_center: &Tensor<(usize, usize), f64, Device>,
    ) -> Tensor<(usize, Const<3>), f64, Device, T>
    where
        T: Tape<f64, Device> + Merge<T> + Merge<NoneTape>,
        MessageNN: Module<
            (Tensor<(usize, Const<N_FEAT>), f64, Device, T>, Tensor<(usize, Const<N_EDGE>), f64, Device, T>),
            Output = Tensor<(usize, Const<N_HIDDEN>), f64, Device, T>,
        >,
        ReadoutNN: Module<
            (Tensor<(usize, Const<N_FEAT>), f64, Device, T>, Tensor<(usize, Const<N_HIDDEN>), f64, Device, T>),
            Output = Tensor<(usize, Const<3>), f64, Device, T>,
        >,
    {
        // Turn every (source features, edge attributes) pair into a message
        let neighbor_feature = edge_feature.gather(edge_src.clone());
        let message = self.message_nn.forward((neighbor_feature, edge_attr));

        // Sum the messages onto their center atoms through the incidence matrix
        let message_sum = message.permute::<_, Axes2<1, 0>>().matmul(gather_center.clone()).permute::<_, Axes2<1, 0>>();

        self.readout_nn.forward((node_feature, message_sum))
    }



    /// Predict the displacement components of all the atoms without gradient tracking,
    /// transferring the host-side features to the device first
    ///
    /// # Parameters
    /// ```
    /// feature: the per-atom feature matrix (natom*N_FEAT Array)
    /// graph: the pair graph of the underlying structure
    /// predicted: the output displacement components in the network ordering (natom*3 Array)
    /// ```
    pub fn predict(&self, feature: &Array2<f64>, graph: &PairGraph) -> Array2<f64>
    {
        let dev: Device = Default::default();
        let natom: usize = feature.nrows();

        let node_feature: Tensor<(usize, Const<N_FEAT>), f64, Device> = dev.tensor_from_vec(feature.iter().cloned().collect(), (natom, Const::<N_FEAT>));
        let edge_feature: Tensor<(usize, Const<N_FEAT>), f64, Device> = node_feature.clone();
        let attr: Array2<f64> = graph.edge_attr();
        let edge_attr: Tensor<(usize, Const<N_EDGE>), f64, Device> = dev.tensor_from_vec(attr.iter().cloned().collect(), (graph.nedge, Const::<N_EDGE>));
        let edge_src: Tensor<(usize,), usize, Device> = dev.tensor_from_vec(graph.edge_src.clone(), (graph.nedge,));
        let gather: Array2<f64> = graph.gather_matrix(natom);
        let gather_center: Tensor<(usize, usize), f64, Device> = dev.tensor_from_vec(gather.iter().cloned().collect(), (graph.nedge, natom));

        let predicted: Tensor<(usize, Const<3>), f64, Device> = self.forward(node_feature, edge_feature, edge_attr, &edge_src, &gather_center);

        Array2::from_shape_vec((natom, 3), predicted.as_vec()).expect(&error_none_value("predicted"))
    }



    /// Allocate gradients for the whole displacement network
    pub fn alloc_grads(&self) -> Gradients<f64, Device>
    {
        // Define a Device (CPU or Cuda) to build tensors
        let dev: Device = Device::seed_from_u64(1314);

        // Allocate gradients for the sub-NNs
        let message_nn_grads: Gradients<f64, Device> = self.message_nn.alloc_grads();
        let readout_nn_grads: Gradients<f64, Device> = self.readout_nn.alloc_grads();

        // Pass the gradients to some temporary tensors, combine the tensors, and return the
        // combined gradients
        let message_temporary_tensor: Tensor<Rank0, f64, Device, OwnedTape<f64, Device>> = dev.zeros().traced(message_nn_grads);
        let readout_temporary_tensor: Tensor<Rank0, f64, Device, OwnedTape<f64, Device>> = dev.zeros().traced(readout_nn_grads);
        let combined_temporary_tensor: Tensor<Rank0, f64, Device, OwnedTape<f64, Device>> = message_temporary_tensor + readout_temporary_tensor;

        combined_temporary_tensor.backward()
    }

    /// Zero the gradients of the whole displacement network
    pub fn zero_grads(&self, grads: &mut Gradients<f64, Device>)
    {
        self.message_nn.zero_grads(grads);
        self.readout_nn.zero_grads(grads);
    }



    /// Save the displacement network into the sub-directory (the path with respect to
    /// directory 'nn') in the safetensors format
    pub fn save(&self, sub_dir: &str)
    {
        let dir: String = format!("nn/{sub_dir}");
        let dir_exist = fs::metadata(&dir);
        match dir_exist
        {
            Ok(_) => (),
            Err(_) => fs::create_dir_all(&dir).expect(&error_dir("creating", &dir)),
        }

        self.message_nn.save_safetensors(format!("{dir}/Message_NN.safetensors")).expect(&error_file("creating", &format!("{dir}/Message_NN.safetensors")));
        self.readout_nn.save_safetensors(format!("{dir}/Readout_NN.safetensors")).expect(&error_file("creating", &format!("{dir}/Readout_NN.safetensors")));
    }

    /// Load the displacement network from the sub-directory (the path with respect to
    /// directory 'nn')
    pub fn load(sub_dir: &str) -> Self
    {
        let mut net: DispNet = DispNet::new();
        let dir: String = format!("nn/{sub_dir}");

        net.message_nn.load_safetensors(format!("{dir}/Message_NN.safetensors")).expect(&error_file("reading", &format!("{dir}/Message_NN.safetensors")));
        net.readout_nn.load_safetensors(format!("{dir}/Readout_NN.safetensors")).expect(&error_file("reading", &format!("{dir}/Readout_NN.safetensors")));

        net
    }
}










impl DispAdam
{
    /// Construct the Adam optimizers for the displacement network
    ///
    /// # Parameters
    /// ```
    /// net: the input displacement network
    /// adam_config: the input configuration for the Adam optimizers
    /// ```
    pub fn new(net: &DispNet, adam_config: AdamConfig) -> Self
    {
        DispAdam
        {
            message_adam: Adam::new(&net.message_nn, adam_config),
            readout_adam: Adam::new(&net.readout_nn, adam_config),
        }
    }



    /// Update all the parameters of the displacement network using the input gradients
    ///
    /// # Parameters
    /// ```
    /// net: the input mutable displacement network
    /// grads: the input gradients of the displacement network
    /// ```
    pub fn update(&mut self, net: &mut DispNet, grads: &Gradients<f64, Device>)
    {
        self.message_adam.update(&mut net.message_nn, grads).expect(&error_nn_para_update("Adam", "Message NN"));
        self.readout_adam.update(&mut net.readout_nn, grads).expect(&error_nn_para_update("Adam", "Readout NN"));
    }
}
