mod context;
mod tagged;
