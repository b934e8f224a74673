pub mod mini_block;
