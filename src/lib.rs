// projeto: triaxial_prep
// file: src/lib.rs
// Preprocessing of triaxial compression simulations into RNN training tensors

pub mod preprocessing;
