pub mod allele_combination;
pub mod image_row;
pub mod variant;
pub mod window;

// re-export for cleaner imports
pub use self::allele_combination::AlleleCombination;
pub use self::image_row::ImageRow;
pub use self::variant::Variant;
pub use self::window::Window;
