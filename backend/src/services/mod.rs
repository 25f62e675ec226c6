pub mod form_batch;
