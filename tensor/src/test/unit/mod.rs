mod broadcast;
mod constructors;
mod matmul;
mod realize;
