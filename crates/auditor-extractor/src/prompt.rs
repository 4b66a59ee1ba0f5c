//! Prompt assembly for the legal audit
//!
//! The model does all of the legal classification; these instructions are the
//! only place that behavior is described. Column lists are kept as data so the
//! table, the CSV header and the tests all agree.

use crate::config::ReportLayout;
use auditor_domain::PdfDocument;
use auditor_llm::GenerationRequest;

/// User turn sent alongside the PDF
pub const USER_INSTRUCTION: &str = "Analise este arquivo PDF conforme suas instruções de sistema.";

const ROLE_AND_RULES: &str = "ATUAÇÃO:
Você é um Auditor Jurídico Sênior. Seu objetivo é analisar relatórios processuais em PDF e gerar indicadores de gestão claros para tomada de decisão.

REGRAS DE CLASSIFICAÇÃO:

1. TEMPORALIDADE (Novos vs. Antigos):
   - \"Novos\": Processos distribuídos nos últimos 30 dias (baseado na data mais recente encontrada no documento ou na data atual).
   - \"Antigos\": Processos anteriores a esse período.

2. STATUS PADRONIZADO (Classifique APENAS nestas 4 categorias):
   - \"Em Andamento\": Processos ativos, aguardando audiência, perícia ou sentença.
   - \"Finalizados\": Processos arquivados, extintos ou com trânsito em julgado (sem mérito de ganho/perda explícito).
   - \"Ganhos\": Processos julgados improcedentes (empresa venceu) ou extintos sem custo.
   - \"Perdidos\": Processos julgados procedentes ou parcialmente procedentes (empresa condenada) ou acordos pagos.

3. DATAS:
   - Extraia a \"Data Início\" (Distribuição).
   - Extraia a \"Data Fim\" (Sentença/Trânsito em Julgado/Arquivamento) se houver. Se não houver, deixe em branco.

4. PASSIVOS:
   - Identifique a razão principal (ex: Horas Extras, Dano Moral).
";

const DATA_MINING_RULES: &str = "
5. MINERAÇÃO DE DADOS (Itens Específicos):
   - Liste os pedidos e verbas específicos de cada processo (ex: Adicional de Insalubridade, FGTS, Multa do Art. 477).
   - Separe os itens com vírgula. Se não houver itens identificáveis, deixe em branco.
";

const EXECUTIVE_SUMMARY: &str = "
FORMATO DE SAÍDA (Obrigatório seguir esta ordem):

PARTE 1: RESUMO EXECUTIVO (Bullet Points)
- Quantidade de Processos NOVOS (últimos 30 dias): [N]
- Quantidade de Processos JÁ EXISTENTES: [N]
- Contagem por Status: [N] Em Andamento, [N] Finalizados, [N] Ganhos, [N] Perdidos.
- Principais Ofensores (Top 3 motivos de passivos):
";

const BASE_TABLE_COLUMNS: &[&str] = &[
    "N. Processo",
    "Status",
    "Data Início",
    "Data Fim",
    "Motivo Passivo",
    "Valor",
];

const DATA_MINING_TABLE_COLUMNS: &[&str] = &[
    "N. Processo",
    "Status",
    "Data Início",
    "Data Fim",
    "Motivo Passivo",
    "Itens Específicos",
    "Valor",
];

const BASE_CSV_COLUMNS: &[&str] = &[
    "Numero_Processo",
    "Status_Padronizado",
    "Novo_ou_Antigo",
    "Data_Inicio",
    "Data_Fim",
    "Motivo_Passivo",
    "Valor_Causa",
];

const DATA_MINING_CSV_COLUMNS: &[&str] = &[
    "Numero_Processo",
    "Status_Padronizado",
    "Novo_ou_Antigo",
    "Data_Inicio",
    "Data_Fim",
    "Motivo_Passivo",
    "Itens_Especificos",
    "Valor_Causa",
];

/// Builds the system instruction and the request for one layout
#[derive(Debug, Clone, Copy)]
pub struct PromptBuilder {
    layout: ReportLayout,
}

impl PromptBuilder {
    /// Create a new prompt builder
    pub fn new(layout: ReportLayout) -> Self {
        Self { layout }
    }

    /// Layout this builder produces
    pub fn layout(&self) -> ReportLayout {
        self.layout
    }

    /// Columns of the markdown table
    pub fn table_columns(&self) -> &'static [&'static str] {
        match self.layout {
            ReportLayout::Base => BASE_TABLE_COLUMNS,
            ReportLayout::DataMining => DATA_MINING_TABLE_COLUMNS,
        }
    }

    /// Columns of the CSV block, in order
    pub fn csv_columns(&self) -> &'static [&'static str] {
        match self.layout {
            ReportLayout::Base => BASE_CSV_COLUMNS,
            ReportLayout::DataMining => DATA_MINING_CSV_COLUMNS,
        }
    }

    /// Expected CSV header line
    pub fn csv_header(&self) -> String {
        self.csv_columns().join(";")
    }

    /// Build the complete system instruction
    pub fn system_instruction(&self) -> String {
        let mut prompt = String::new();

        prompt.push_str(ROLE_AND_RULES);
        if self.layout == ReportLayout::DataMining {
            prompt.push_str(DATA_MINING_RULES);
        }
        prompt.push_str(EXECUTIVE_SUMMARY);

        prompt.push_str("\nPARTE 2: TABELA VISUAL (Markdown)\n");
        prompt.push_str("Crie uma tabela com as colunas:\n");
        prompt.push_str(&format!("| {} |\n", self.table_columns().join(" | ")));

        prompt.push_str("\nPARTE 3: DADOS PARA EXCEL (CSV)\n");
        prompt.push_str("- Bloco de código para copiar e colar, marcado como ```csv.\n");
        prompt.push_str("- Separador: PONTO E VÍRGULA (;)\n");
        prompt.push_str("- Formato de data: DD/MM/AAAA\n");
        prompt.push_str(&format!("- Colunas: {}", self.csv_header()));

        prompt
    }

    /// Assemble the request for a document, consuming its bytes
    pub fn build(&self, document: PdfDocument, temperature: f32) -> GenerationRequest {
        let mime_type = document.mime_type();
        GenerationRequest::new(self.system_instruction())
            .with_inline_data(mime_type, document.into_bytes())
            .with_text(USER_INSTRUCTION)
            .with_temperature(temperature)
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(ReportLayout::default())
    }
}
