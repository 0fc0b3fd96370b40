pub mod typed_index;
pub mod shape;

// Convex shape primitives
pub mod sphere;
pub mod box_shape;
pub mod capsule;
pub mod triangle;

// Compound shapes
pub mod compound;

// Mesh
pub mod mesh;

// Shape batch management
pub mod shapes;
