//! About the output files.
use crate::common::error::*;
use std::fs;
use std::fs::File;
use std::io::Write;





/// Specify the output path for the output files
///
/// # Parameters
/// ```
/// index: the input index that specifies where to output the files
/// output_path: the path for the output files
/// ```
pub fn create_output_path(index: Option<usize>) -> String
{
    match index
    {
        // If index exists, create a directory and output the files to it
        Some(index) =>
        {
            let dir: String = format!("{}", index);
            let dir_exist = fs::metadata(&dir);
            // If the directory already exist, do nothing; otherwise, create the directory
            match dir_exist
            {
                Ok(_) => (),
                Err(_) => fs::create_dir(&dir).expect(&error_dir("creating", &dir)),
            }

            format!("{}/", index)
        },

        // If index non-exists, output the files to the current directory
        None =>
        {
            String::new()
        },
    }
}





/// Write the final run summary: the last losses of both phases and the detected space group
///
/// # Parameters
/// ```
/// filename: name of the summary file to be writen
/// loss_model: the model-phase losses of all the steps
/// loss_order: the order-phase losses of all the steps
/// space_group: the space-group number of the reconstructed structure
/// ```
pub fn write_run_summary(filename: &str, loss_model: &[f64], loss_order: &[f64], space_group: i32)
{
    let mut summary = File::create(filename).expect(&error_file("creating", filename));
    summary.write_all(b"                   final_model_loss         final_order_loss         space_group\n").expect(&error_file("writing", filename));
    let final_model: f64 = match loss_model.last()
    {
        Some(value) => *value,
        None => f64::NAN,
    };
    let final_order: f64 = match loss_order.last()
    {
        Some(value) => *value,
        None => f64::NAN,
    };
    summary.write_all(format!("        {:25.8} {:24.8} {:19}\n", final_model, final_order, space_group).as_bytes()).expect(&error_file("writing", filename));
}
