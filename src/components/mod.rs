pub mod regions_layer;
