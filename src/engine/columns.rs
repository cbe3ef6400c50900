//! Census column names, verbatim as published.

pub const CODE: &str = "CD_BAIRRO";
pub const NAME: &str = "NM_BAIRRO";
pub const POPULATION: &str = "Quantidade de moradores";
pub const MALE: &str = "Sexo masculino";
pub const FEMALE: &str = "Sexo feminino";

/// Columns every loaded table must carry.
pub const REQUIRED: [&str; 5] = [CODE, NAME, POPULATION, MALE, FEMALE];

pub const RESPONSIBLE_PERSONS: &str =
    "Pessoas responsáveis em domicílios particulares permanentes ocupados";
pub const HOUSEHOLD_RESIDENTS: &str = "Moradores em domicílios particulares permanentes ocupados";
pub const AVERAGE_INCOME: &str = "Valor do rendimento nominal médio mensal das pessoas responsáveis com rendimentos por domicílios particulares permanentes ocupados";
pub const INCOME_VARIANCE: &str = "Variância do rendimento nominal mensal das pessoas responsáveis com rendimentos por domicílios particulares permanentes ocupados";

pub const HOUSE: &str = "Domicílios Particulares Permanentes Ocupados, Tipo de espécie é casa";
pub const ROW_HOUSE: &str =
    "Domicílios Particulares Permanentes Ocupados, Tipo de espécie é casa de vila ou em condomínio";
pub const APARTMENT: &str =
    "Domicílios Particulares Permanentes Ocupados, Tipo de espécie é apartamento";
pub const TENEMENT: &str = "Domicílios Particulares Permanentes Ocupados, Tipo de espécie é habitação em casa de cômodos ou cortiço";

// Age-band columns read "Sexo masculino, 0 a 4 anos".
pub const AGE_UNIT: &str = "anos";
pub const AGE_LABEL_PREFIX: &str = "Sexo masculino, ";
