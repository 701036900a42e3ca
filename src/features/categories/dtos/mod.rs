mod category_dto;

pub use category_dto::{
    CategoryCandidate, CategoryResponseDto, CreateCategoryDto, UpdateCategoryDto,
};
